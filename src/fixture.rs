//! Rundown fixtures on disk.
//!
//! A fixture is a serialized [`RundownInterface`]. The format follows the
//! file extension: `.toml` is TOML, anything else is read as JSON.

use anyhow::{Context, Result};
use onair_core::{Rundown, RundownInterface};
use std::path::Path;

/// Read a fixture without building the rundown.
pub fn load_interface(path: &Path) -> Result<RundownInterface> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture: {:?}", path))?;

    let interface = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML fixture: {:?}", path))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON fixture: {:?}", path))?,
    };

    Ok(interface)
}

/// Read a fixture and build the rundown it describes.
pub fn load_rundown(path: &Path) -> Result<Rundown> {
    let interface = load_interface(path)?;
    let rundown = Rundown::new(interface)
        .with_context(|| format!("Fixture does not describe a valid rundown: {:?}", path))?;

    tracing::debug!(
        rundown = %rundown.id(),
        segments = rundown.segments().len(),
        active = rundown.is_active(),
        "loaded fixture"
    );

    Ok(rundown)
}
