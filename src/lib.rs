//! onair - rundown rehearsal harness
//!
//! This library crate exposes the harness around `onair-core` for
//! integration testing.

pub mod config;
pub mod fixture;
pub mod rehearsal;
