//! onair-core: the playback state machine of a broadcast rundown.
//!
//! A [`Rundown`] owns an ordered tree of [`Segment`]s, [`Part`]s and
//! [`Piece`]s. Taking the next part moves the on-air pointer forward,
//! recomputes which infinite piece occupies each layer and lets the caller
//! compute the transition [`PartTimings`] of the part that just went on air.
//!
//! The crate performs no I/O and never reads the clock: every mutating
//! operation receives the current time from its caller.
//!
//! # Modules
//!
//! - [`lifespan`] - Piece lifespan classification
//! - [`piece`] - Pieces and their construction data
//! - [`timings`] - Transition timing calculation
//! - [`part`] - Parts and their timings
//! - [`segment`] - Segments and the look-behind searches
//! - [`rundown`] - The rundown aggregate and take-next

pub mod error;
pub mod ids;
mod infinite;
pub mod lifespan;
pub mod part;
pub mod piece;
pub mod rundown;
pub mod segment;
pub mod timings;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, ErrorKind, Result};
pub use ids::*;
pub use lifespan::PieceLifespan;
pub use part::{Part, PartInterface};
pub use piece::{Piece, PieceInterface, PieceType, TimelineObject, Timestamp, TransitionType};
pub use rundown::{Rundown, RundownInterface};
pub use segment::{Segment, SegmentInterface};
pub use timings::{AutoNext, InTransition, OutTransition, PartTimings, PrecedingPart};
