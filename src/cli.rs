use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "onair")]
#[command(author, version, about = "Rundown playback engine and rehearsal tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Activate a rundown fixture and take through it
    Rehearse {
        /// Rundown fixture (JSON, or TOML by extension)
        #[arg(required = true)]
        fixture: PathBuf,

        /// Number of takes (defaults to the configured maximum)
        #[arg(short, long)]
        takes: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the structure and playback state of a rundown fixture
    Inspect {
        /// Rundown fixture (JSON, or TOML by extension)
        #[arg(required = true)]
        fixture: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
