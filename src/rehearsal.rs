//! Drive a rundown through a sequence of takes without any devices attached.
//!
//! A rehearsal activates the rundown when needed, takes the next part at a
//! fixed simulated interval and records a snapshot of the playback state
//! after every step.

use anyhow::{Context, Result};
use onair_core::{Error, PartTimings, Rundown, Timestamp};
use serde::Serialize;

use crate::config::RehearsalConfig;

/// Playback state right after one step of a rehearsal.
#[derive(Debug, Clone, Serialize)]
pub struct TakeReport {
    /// 0 is the activation, 1.. are takes.
    pub take: usize,
    pub at: Timestamp,
    pub segment: String,
    pub part: String,
    pub previous_part: Option<String>,
    pub next_part: Option<String>,
    pub infinite_pieces: Vec<InfiniteEntry>,
    pub timings: Option<PartTimings>,
}

/// One occupied layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfiniteEntry {
    pub layer: String,
    pub piece: String,
    pub executed_at: Timestamp,
}

/// Why a rehearsal stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndOfRundown,
    TakeLimit,
}

#[derive(Debug, Clone, Serialize)]
pub struct RehearsalReport {
    pub rundown: String,
    pub name: String,
    pub started_at: Timestamp,
    pub steps: Vec<TakeReport>,
    pub stopped: StopReason,
}

impl RehearsalReport {
    /// Number of takes after activation.
    pub fn takes(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Clock value of the first step: the configured start, or now.
pub fn start_time(config: &RehearsalConfig) -> Timestamp {
    config
        .start_time_ms
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
}

/// Rehearse `rundown`, taking at most `takes` parts (capped by
/// `config.max_takes`).
pub fn rehearse(
    rundown: &mut Rundown,
    config: &RehearsalConfig,
    takes: Option<usize>,
    started_at: Timestamp,
) -> Result<RehearsalReport> {
    let limit = takes.unwrap_or(config.max_takes).min(config.max_takes);
    let interval = i64::try_from(config.take_interval_ms)
        .context("Take interval does not fit into a timestamp")?;

    let mut now = started_at;
    if !rundown.is_active() {
        rundown
            .activate(now)
            .with_context(|| format!("Failed to activate rundown {}", rundown.id()))?;
    }

    let mut steps = vec![snapshot(rundown, 0, now, config.calculate_timings)?];
    let mut stopped = StopReason::TakeLimit;

    for take in 1..=limit {
        now = now.saturating_add(interval);
        match rundown.take_next(now) {
            Ok(()) => {}
            Err(Error::NoNextPart(_)) => {
                stopped = StopReason::EndOfRundown;
                break;
            }
            Err(err) => return Err(err).context(format!("Take {take} failed")),
        }
        steps.push(snapshot(rundown, take, now, config.calculate_timings)?);
    }

    if stopped == StopReason::TakeLimit && rundown.next_part().is_none() {
        stopped = StopReason::EndOfRundown;
    }

    tracing::info!(
        rundown = %rundown.id(),
        takes = steps.len() - 1,
        ?stopped,
        "rehearsal finished"
    );

    Ok(RehearsalReport {
        rundown: rundown.id().to_string(),
        name: rundown.name().to_string(),
        started_at,
        steps,
        stopped,
    })
}

fn snapshot(
    rundown: &mut Rundown,
    take: usize,
    at: Timestamp,
    calculate_timings: bool,
) -> Result<TakeReport> {
    let timings = if calculate_timings {
        Some(rundown.calculate_active_part_timings()?)
    } else {
        None
    };

    let segment = rundown.active_segment()?.id().to_string();
    let part = rundown.active_part()?.id().to_string();

    let mut infinite_pieces: Vec<InfiniteEntry> = rundown
        .infinite_pieces()
        .into_iter()
        .map(|piece| InfiniteEntry {
            layer: piece.layer().to_string(),
            piece: piece.id().to_string(),
            executed_at: piece.executed_at(),
        })
        .collect();
    infinite_pieces.sort_by(|a, b| a.layer.cmp(&b.layer));

    Ok(TakeReport {
        take,
        at,
        segment,
        part,
        previous_part: rundown.previous_part().map(|p| p.id().to_string()),
        next_part: rundown.next_part().map(|p| p.id().to_string()),
        infinite_pieces,
        timings,
    })
}
