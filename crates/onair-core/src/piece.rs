//! A single playable element placed on a layer of a part.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{PartId, PieceId};
use crate::lifespan::PieceLifespan;

/// Epoch milliseconds supplied by the caller. `0` means "not set".
pub type Timestamp = i64;

/// Opaque timeline payload; passed through untouched.
pub type TimelineObject = serde_json::Value;

// ---------------------------------------------------------------------------
// PieceType / TransitionType
// ---------------------------------------------------------------------------

/// What kind of content a piece carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceType {
    Camera,
    VideoClip,
    Graphics,
    Audio,
    VoiceOver,
    Remote,
    SplitScreen,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Camera => write!(f, "camera"),
            Self::VideoClip => write!(f, "video_clip"),
            Self::Graphics => write!(f, "graphics"),
            Self::Audio => write!(f, "audio"),
            Self::VoiceOver => write!(f, "voice_over"),
            Self::Remote => write!(f, "remote"),
            Self::SplitScreen => write!(f, "split_screen"),
        }
    }
}

/// Whether a piece plays as part of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    #[default]
    NoTransition,
    InTransition,
    OutTransition,
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransition => write!(f, "no_transition"),
            Self::InTransition => write!(f, "in_transition"),
            Self::OutTransition => write!(f, "out_transition"),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction data
// ---------------------------------------------------------------------------

/// Plain construction data for a [`Piece`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PieceInterface {
    pub id: PieceId,
    pub part_id: PartId,
    #[serde(default)]
    pub name: String,
    pub layer: String,
    #[serde(default, rename = "type")]
    pub piece_type: PieceType,
    #[serde(default)]
    pub piece_lifespan: PieceLifespan,
    #[serde(default)]
    pub start: u64,
    /// `0` means open ended.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub pre_roll_duration: u64,
    #[serde(default)]
    pub post_roll_duration: u64,
    #[serde(default)]
    pub transition_type: TransitionType,
    #[serde(default)]
    pub timeline_objects: Vec<TimelineObject>,
    #[serde(default)]
    pub executed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// One item of content on a layer. Immutable apart from `executed_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Piece {
    id: PieceId,
    part_id: PartId,
    name: String,
    layer: String,
    #[serde(rename = "type")]
    piece_type: PieceType,
    piece_lifespan: PieceLifespan,
    start: u64,
    duration: u64,
    pre_roll_duration: u64,
    post_roll_duration: u64,
    transition_type: TransitionType,
    timeline_objects: Vec<TimelineObject>,
    executed_at: Timestamp,
}

impl Piece {
    pub fn new(interface: PieceInterface) -> Self {
        let executed_at = if interface.piece_lifespan.is_infinite() {
            interface.executed_at
        } else {
            0
        };

        Self {
            id: interface.id,
            part_id: interface.part_id,
            name: interface.name,
            layer: interface.layer,
            piece_type: interface.piece_type,
            piece_lifespan: interface.piece_lifespan,
            start: interface.start,
            duration: interface.duration,
            pre_roll_duration: interface.pre_roll_duration,
            post_roll_duration: interface.post_roll_duration,
            transition_type: interface.transition_type,
            timeline_objects: interface.timeline_objects,
            executed_at,
        }
    }

    pub fn id(&self) -> &PieceId {
        &self.id
    }

    pub fn part_id(&self) -> &PartId {
        &self.part_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    pub fn piece_lifespan(&self) -> PieceLifespan {
        self.piece_lifespan
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn pre_roll_duration(&self) -> u64 {
        self.pre_roll_duration
    }

    pub fn post_roll_duration(&self) -> u64 {
        self.post_roll_duration
    }

    pub fn transition_type(&self) -> TransitionType {
        self.transition_type
    }

    pub fn timeline_objects(&self) -> &[TimelineObject] {
        &self.timeline_objects
    }

    /// Record when the piece went on air as an infinite occupant.
    ///
    /// Ignored for [`PieceLifespan::WithinPart`] pieces.
    pub fn set_executed_at(&mut self, time: Timestamp) {
        if self.piece_lifespan == PieceLifespan::WithinPart {
            return;
        }
        self.executed_at = time;
    }

    /// Clear the on-air timestamp after the piece lost its layer.
    pub fn reset_executed_at(&mut self) {
        self.executed_at = 0;
    }

    pub fn executed_at(&self) -> Timestamp {
        self.executed_at
    }
}
