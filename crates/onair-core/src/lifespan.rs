//! How long a piece stays valid once it has been taken.
//!
//! "Sticky" lifespans are carried forward until a newer piece claims the
//! layer or their scope ends. "Spanning" lifespans are never carried
//! passively; they are re-derived on every take by looking backwards through
//! the segment (and, for rundown scope, through earlier segments).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifespan classification of a [`Piece`](crate::Piece).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceLifespan {
    /// Ordinary piece, ends with its part.
    #[default]
    WithinPart,
    StickyUntilSegmentChange,
    SpanningUntilSegmentEnd,
    StickyUntilRundownChange,
    SpanningUntilRundownEnd,
    StartSpanningSegmentThenStickyRundown,
}

impl PieceLifespan {
    /// Whether a piece with this lifespan can outlive its part.
    pub fn is_infinite(self) -> bool {
        match self {
            Self::WithinPart => false,
            Self::StickyUntilSegmentChange
            | Self::SpanningUntilSegmentEnd
            | Self::StickyUntilRundownChange
            | Self::SpanningUntilRundownEnd
            | Self::StartSpanningSegmentThenStickyRundown => true,
        }
    }

    /// Whether the segment look-behind picks this lifespan up.
    pub fn is_spanning(self) -> bool {
        match self {
            Self::SpanningUntilRundownEnd
            | Self::SpanningUntilSegmentEnd
            | Self::StartSpanningSegmentThenStickyRundown => true,
            Self::WithinPart | Self::StickyUntilSegmentChange | Self::StickyUntilRundownChange => {
                false
            }
        }
    }

    /// Whether the piece keeps its layer after playback leaves its segment.
    pub fn survives_segment_change(self) -> bool {
        match self {
            Self::StickyUntilRundownChange
            | Self::SpanningUntilRundownEnd
            | Self::StartSpanningSegmentThenStickyRundown => true,
            Self::WithinPart | Self::StickyUntilSegmentChange | Self::SpanningUntilSegmentEnd => {
                false
            }
        }
    }
}

impl fmt::Display for PieceLifespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithinPart => write!(f, "within_part"),
            Self::StickyUntilSegmentChange => write!(f, "sticky_until_segment_change"),
            Self::SpanningUntilSegmentEnd => write!(f, "spanning_until_segment_end"),
            Self::StickyUntilRundownChange => write!(f, "sticky_until_rundown_change"),
            Self::SpanningUntilRundownEnd => write!(f, "spanning_until_rundown_end"),
            Self::StartSpanningSegmentThenStickyRundown => {
                write!(f, "start_spanning_segment_then_sticky_rundown")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PieceLifespan; 6] = [
        PieceLifespan::WithinPart,
        PieceLifespan::StickyUntilSegmentChange,
        PieceLifespan::SpanningUntilSegmentEnd,
        PieceLifespan::StickyUntilRundownChange,
        PieceLifespan::SpanningUntilRundownEnd,
        PieceLifespan::StartSpanningSegmentThenStickyRundown,
    ];

    #[test]
    fn only_within_part_is_finite() {
        let finite: Vec<_> = ALL.iter().filter(|l| !l.is_infinite()).collect();
        assert_eq!(finite, vec![&PieceLifespan::WithinPart]);
    }

    #[test]
    fn spanning_set() {
        let spanning: Vec<_> = ALL.iter().copied().filter(|l| l.is_spanning()).collect();
        assert_eq!(
            spanning,
            vec![
                PieceLifespan::SpanningUntilSegmentEnd,
                PieceLifespan::SpanningUntilRundownEnd,
                PieceLifespan::StartSpanningSegmentThenStickyRundown,
            ]
        );
    }

    #[test]
    fn segment_scoped_lifespans_do_not_survive_segment_change() {
        assert!(!PieceLifespan::StickyUntilSegmentChange.survives_segment_change());
        assert!(!PieceLifespan::SpanningUntilSegmentEnd.survives_segment_change());
        assert!(PieceLifespan::StickyUntilRundownChange.survives_segment_change());
        assert!(PieceLifespan::StartSpanningSegmentThenStickyRundown.survives_segment_change());
    }

    #[test]
    fn serde_matches_display() {
        for lifespan in ALL {
            let json = serde_json::to_string(&lifespan).unwrap();
            assert_eq!(json, format!("\"{lifespan}\""));
        }
    }
}
