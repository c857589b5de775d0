mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./onair.toml",
        "~/.config/onair/config.toml",
        "/etc/onair/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.rehearsal.take_interval_ms == 0 {
        anyhow::bail!("Rehearsal take interval cannot be 0");
    }

    if config.rehearsal.max_takes == 0 {
        anyhow::bail!("Rehearsal max takes cannot be 0");
    }

    if config.logging.filter.trim().is_empty() {
        tracing::warn!("Logging filter is empty, nothing will be logged");
    }

    Ok(())
}
