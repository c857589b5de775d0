mod cli;

use onair::{
    config::{self, Config, OutputFormat},
    fixture,
    rehearsal::{self, RehearsalReport, StopReason},
};
use onair_core::{PartTimings, Rundown, Timestamp};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load_config_or_default(cli.config.as_deref());

    // Initialize logging
    // RUST_LOG wins, then --verbose, then the configured filter
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "onair=trace,onair_core=trace".to_string()
        } else {
            loaded
                .as_ref()
                .map(|config| config.logging.filter.clone())
                .unwrap_or_else(|_| config::LoggingConfig::default().filter)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Rehearse {
            fixture,
            takes,
            json,
        } => rehearse(&fixture, &loaded?, takes, json),
        Commands::Inspect { fixture } => inspect(&fixture),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("onair {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn rehearse(path: &Path, config: &Config, takes: Option<usize>, json: bool) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Fixture does not exist: {:?}", path);
    }

    let mut rundown = fixture::load_rundown(path)?;
    let started_at = rehearsal::start_time(&config.rehearsal);

    tracing::info!("Rehearsing {:?} from {}", path, started_at);
    let report = rehearsal::rehearse(&mut rundown, &config.rehearsal, takes, started_at)?;

    if json || config.rehearsal.output == OutputFormat::Json {
        let json_str = serde_json::to_string_pretty(&report)?;
        println!("{}", json_str);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RehearsalReport) {
    println!("Rundown: {} ({})", report.name, report.rundown);
    println!("Started: {}", format_timestamp(report.started_at));

    for step in &report.steps {
        let label = if step.take == 0 {
            "Activate".to_string()
        } else {
            format!("Take {}", step.take)
        };
        println!(
            "\n{} @ +{}ms: {}/{}",
            label,
            step.at - report.started_at,
            step.segment,
            step.part
        );
        println!("  Next: {}", step.next_part.as_deref().unwrap_or("-"));

        if let Some(ref timings) = step.timings {
            println!("  Timings: {}", format_timings(timings));
        }

        for entry in &step.infinite_pieces {
            println!(
                "  [{}] {} (since +{}ms)",
                entry.layer,
                entry.piece,
                entry.executed_at - report.started_at
            );
        }
    }

    let reason = match report.stopped {
        StopReason::EndOfRundown => "end of rundown",
        StopReason::TakeLimit => "take limit",
    };
    println!("\nStopped at {} after {} takes", reason, report.takes());
}

fn format_timings(timings: &PartTimings) -> String {
    let in_transition = timings
        .in_transition_start
        .map_or_else(|| "none".to_string(), |start| format!("{}ms", start));
    format!(
        "in-transition {}, pieces +{}ms, previous part +{}ms, post-roll {}ms",
        in_transition,
        timings.delay_start_of_pieces_duration,
        timings.previous_part_continue_into_part_duration,
        timings.post_roll_duration
    )
}

fn format_timestamp(ms: Timestamp) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn inspect(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Fixture does not exist: {:?}", path);
    }

    let rundown = fixture::load_rundown(path)?;
    print_rundown(&rundown);
    Ok(())
}

fn print_rundown(rundown: &Rundown) {
    println!("Rundown: {} ({})", rundown.name(), rundown.id());
    println!("Active: {}", rundown.is_active());
    if rundown.last_time_modified() != 0 {
        println!("Modified: {}", format_timestamp(rundown.last_time_modified()));
    }

    println!("\nSegments: {}", rundown.segments().len());
    for segment in rundown.segments() {
        print!("  [{}] {} {}", segment.rank(), segment.id(), segment.name());
        if segment.is_on_air() {
            print!(" [on air]");
        }
        if segment.is_next() {
            print!(" [next]");
        }
        println!();

        for part in segment.parts() {
            print!(
                "      [{}] {} {} ({} pieces)",
                part.rank(),
                part.id(),
                part.name(),
                part.pieces().len()
            );
            if part.is_on_air() {
                print!(" [on air]");
            }
            if part.is_next() {
                print!(" [next]");
            }
            println!();

            for piece in part.pieces() {
                println!(
                    "        {} {} on {} ({}, {})",
                    piece.id(),
                    piece.piece_type(),
                    piece.layer(),
                    piece.piece_lifespan(),
                    piece.transition_type()
                );
            }
        }
    }

    let infinite = rundown.infinite_pieces();
    println!("\nInfinite pieces: {}", infinite.len());
    for piece in infinite {
        println!("  [{}] {}", piece.layer(), piece.id());
    }

    println!("Baseline objects: {}", rundown.baseline().len());
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Logging filter: {}", config.logging.filter);
            println!(
                "  Take interval: {}ms",
                config.rehearsal.take_interval_ms
            );
            println!("  Max takes: {}", config.rehearsal.max_takes);
            println!("  Output: {}", config.rehearsal.output);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!(
                "  Take interval: {}ms",
                config.rehearsal.take_interval_ms
            );
            println!("  Max takes: {}", config.rehearsal.max_takes);
        }
    }

    Ok(())
}
