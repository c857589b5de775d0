use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub rehearsal: RehearsalConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "onair=info,onair_core=info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RehearsalConfig {
    /// Clock value of the first take, in epoch milliseconds. Uses the wall
    /// clock when unset.
    #[serde(default)]
    pub start_time_ms: Option<i64>,

    /// Simulated time between two takes
    #[serde(default = "default_take_interval")]
    pub take_interval_ms: u64,

    /// Upper bound on takes per rehearsal
    #[serde(default = "default_max_takes")]
    pub max_takes: usize,

    /// Calculate part timings after every take
    #[serde(default = "default_true")]
    pub calculate_timings: bool,

    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for RehearsalConfig {
    fn default() -> Self {
        Self {
            start_time_ms: None,
            take_interval_ms: default_take_interval(),
            max_takes: default_max_takes(),
            calculate_timings: default_true(),
            output: OutputFormat::default(),
        }
    }
}

fn default_take_interval() -> u64 {
    5_000
}

fn default_max_takes() -> usize {
    500
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
