//! Unified error type for the playback engine.
//!
//! Every failure is reported through [`Error`]. Callers that only care about
//! the broad category can branch on [`Error::kind`].

use std::fmt;

use crate::ids::{PartId, RundownId, SegmentId};

/// Unified error type covering all failure modes of the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "part", "segment").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// `timings()` was read before `calculate_timings()` ran.
    #[error("Timings not yet calculated for part {0}")]
    TimingsNotCalculated(PartId),

    /// `find_next_part` was asked to step past the end of a segment.
    #[error("Part {part_id} is the last part in segment {segment_id}")]
    LastPartInSegment {
        /// Segment that was searched.
        segment_id: SegmentId,
        /// The part the search started from.
        part_id: PartId,
    },

    /// The segment holds no parts.
    #[error("Segment {0} has no parts")]
    EmptySegment(SegmentId),

    /// The rundown has run out of parts to take.
    #[error("Rundown {0} has no next part")]
    NoNextPart(RundownId),

    /// The operation requires an active rundown.
    #[error("Rundown {0} is not active")]
    NotActive(RundownId),

    /// The rundown was activated twice.
    #[error("Rundown {0} is already active")]
    AlreadyActive(RundownId),

    /// The rundown has no part that could go on air.
    #[error("Rundown {0} has no parts")]
    EmptyRundown(RundownId),

    /// Construction data is inconsistent.
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),
}

/// Broad failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidStructuralOperation,
    InvalidConstruction,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::InvalidStructuralOperation => write!(f, "invalid_structural_operation"),
            Self::InvalidConstruction => write!(f, "invalid_construction"),
        }
    }
}

impl Error {
    /// Map this error to its category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::TimingsNotCalculated(_) => ErrorKind::NotFound,
            Error::LastPartInSegment { .. } => ErrorKind::InvalidStructuralOperation,
            Error::EmptySegment(_) => ErrorKind::InvalidStructuralOperation,
            Error::NoNextPart(_) => ErrorKind::InvalidStructuralOperation,
            Error::NotActive(_) => ErrorKind::InvalidStructuralOperation,
            Error::AlreadyActive(_) => ErrorKind::InvalidStructuralOperation,
            Error::EmptyRundown(_) => ErrorKind::InvalidStructuralOperation,
            Error::InvalidConstruction(_) => ErrorKind::InvalidConstruction,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::InvalidConstruction`].
    pub fn invalid_construction(message: impl Into<String>) -> Self {
        Error::InvalidConstruction(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("part", "p-42");
        assert_eq!(err.to_string(), "part not found: p-42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn timings_not_calculated_is_not_found() {
        let err = Error::TimingsNotCalculated(PartId::from("p1"));
        assert_eq!(err.to_string(), "Timings not yet calculated for part p1");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn last_part_in_segment_display() {
        let err = Error::LastPartInSegment {
            segment_id: SegmentId::from("s1"),
            part_id: PartId::from("p3"),
        };
        assert_eq!(err.to_string(), "Part p3 is the last part in segment s1");
        assert_eq!(err.kind(), ErrorKind::InvalidStructuralOperation);
    }

    #[test]
    fn invalid_construction_display() {
        let err = Error::invalid_construction("active rundown is missing next_part_id");
        assert_eq!(
            err.to_string(),
            "Invalid construction: active rundown is missing next_part_id"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidConstruction);
    }

    #[test]
    fn structural_errors_share_a_kind() {
        let id = RundownId::from("r1");
        for err in [
            Error::NoNextPart(id.clone()),
            Error::NotActive(id.clone()),
            Error::AlreadyActive(id.clone()),
            Error::EmptyRundown(id),
            Error::EmptySegment(SegmentId::from("s1")),
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidStructuralOperation);
        }
    }

    #[test]
    fn kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(
            ErrorKind::InvalidStructuralOperation.to_string(),
            "invalid_structural_operation"
        );
    }
}
