//! Transition timings between an outgoing and an incoming part.
//!
//! [`calculate`] is a pure function: it sees the incoming part only through
//! its own pre-roll/post-roll and in-transition, and the outgoing part only
//! through the [`PrecedingPart`] read surface.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transition configuration
// ---------------------------------------------------------------------------

/// Behaviour when taking into a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InTransition {
    #[serde(default)]
    pub keep_previous_part_alive_duration: u64,
    #[serde(default)]
    pub delay_pieces_duration: u64,
}

/// Behaviour when taking out of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutTransition {
    #[serde(default)]
    pub keep_alive_duration: u64,
}

/// Timer-driven advance to the following part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoNext {
    #[serde(default)]
    pub overlap: u64,
}

// ---------------------------------------------------------------------------
// PartTimings
// ---------------------------------------------------------------------------

/// Offsets consumed by the device scheduling layer. Always produced whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartTimings {
    /// `None` when no in-transition should play.
    pub in_transition_start: Option<u64>,
    pub delay_start_of_pieces_duration: u64,
    pub post_roll_duration: u64,
    pub previous_part_continue_into_part_duration: u64,
}

/// What the timing calculation needs to know about the outgoing part.
pub trait PrecedingPart {
    fn out_transition(&self) -> Option<&OutTransition>;

    fn auto_next(&self) -> Option<&AutoNext>;

    fn disable_next_in_transition(&self) -> bool;

    /// Post-roll computed when the outgoing part itself was timed; 0 if it
    /// never was.
    fn post_roll_duration(&self) -> u64;
}

/// Compute the timings of a part.
///
/// The first matching rule wins:
/// 1. no previous part: everything is driven by the own pre-roll;
/// 2. the previous part auto-nexts: never an in-transition, the keep-alive
///    window left after the overlap is used when it exceeds the pre-roll;
/// 3. the previous part disables the in-transition: behaves like 1 but the
///    previous part's post-roll is ignored;
/// 4. manual take: the in-transition starts once the previous part's
///    keep-alive window has elapsed, or after the pre-roll if that is longer.
///
/// Every subtraction saturates at zero and every addition at `u64::MAX`.
pub fn calculate(
    own_pre_roll: u64,
    own_post_roll: u64,
    in_transition: Option<&InTransition>,
    previous: Option<&dyn PrecedingPart>,
) -> PartTimings {
    let Some(previous) = previous else {
        return PartTimings {
            in_transition_start: None,
            delay_start_of_pieces_duration: own_pre_roll,
            post_roll_duration: own_post_roll,
            previous_part_continue_into_part_duration: own_pre_roll,
        };
    };

    let keep_prev_alive = in_transition.map_or(0, |t| t.keep_previous_part_alive_duration);
    let delay_pieces = in_transition.map_or(0, |t| t.delay_pieces_duration);
    let pp_keep_alive = previous.out_transition().map_or(0, |t| t.keep_alive_duration);
    let pp_post_roll = previous.post_roll_duration();

    if let Some(auto_next) = previous.auto_next() {
        let pp_overlap = auto_next.overlap;
        let available = pp_keep_alive.saturating_sub(pp_overlap);
        let delay = available.max(own_pre_roll);
        return PartTimings {
            in_transition_start: None,
            delay_start_of_pieces_duration: delay,
            post_roll_duration: own_post_roll,
            previous_part_continue_into_part_duration: delay
                .saturating_add(pp_overlap)
                .saturating_add(pp_post_roll),
        };
    }

    if previous.disable_next_in_transition() {
        return PartTimings {
            in_transition_start: None,
            delay_start_of_pieces_duration: own_pre_roll,
            post_roll_duration: own_post_roll,
            previous_part_continue_into_part_duration: own_pre_roll,
        };
    }

    let available = pp_keep_alive.saturating_sub(keep_prev_alive);
    let threshold = own_pre_roll.saturating_sub(delay_pieces);

    if available >= threshold {
        PartTimings {
            in_transition_start: Some(available),
            delay_start_of_pieces_duration: available.saturating_add(delay_pieces),
            post_roll_duration: own_post_roll,
            previous_part_continue_into_part_duration: available
                .saturating_add(keep_prev_alive)
                .saturating_add(pp_post_roll),
        }
    } else {
        PartTimings {
            in_transition_start: Some(own_pre_roll),
            delay_start_of_pieces_duration: own_pre_roll,
            post_roll_duration: own_post_roll,
            previous_part_continue_into_part_duration: own_pre_roll
                .saturating_add(keep_prev_alive)
                .saturating_add(pp_post_roll),
        }
    }
}
