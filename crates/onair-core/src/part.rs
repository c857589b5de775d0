//! An orderable, independently timed unit of content.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{PartId, PieceId, SegmentId};
use crate::piece::{Piece, PieceInterface};
use crate::timings::{self, AutoNext, InTransition, OutTransition, PartTimings, PrecedingPart};

/// Plain construction data for a [`Part`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartInterface {
    pub id: PartId,
    pub segment_id: SegmentId,
    pub rank: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_on_air: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub expected_duration: u64,
    #[serde(default)]
    pub pieces: Vec<PieceInterface>,
    #[serde(default)]
    pub in_transition: Option<InTransition>,
    #[serde(default)]
    pub out_transition: Option<OutTransition>,
    #[serde(default)]
    pub auto_next: Option<AutoNext>,
    #[serde(default)]
    pub disable_next_in_transition: bool,
}

/// A sequence of pieces played together, plus its transition configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    id: PartId,
    segment_id: SegmentId,
    rank: f64,
    name: String,
    is_on_air: bool,
    is_next: bool,
    expected_duration: u64,
    pieces: Vec<Piece>,
    in_transition: Option<InTransition>,
    out_transition: Option<OutTransition>,
    auto_next: Option<AutoNext>,
    disable_next_in_transition: bool,
    timings: Option<PartTimings>,
}

impl Part {
    pub fn new(interface: PartInterface) -> Self {
        Self {
            id: interface.id,
            segment_id: interface.segment_id,
            rank: interface.rank,
            name: interface.name,
            is_on_air: interface.is_on_air,
            is_next: interface.is_next,
            expected_duration: interface.expected_duration,
            pieces: interface.pieces.into_iter().map(Piece::new).collect(),
            in_transition: interface.in_transition,
            out_transition: interface.out_transition,
            auto_next: interface.auto_next,
            disable_next_in_transition: interface.disable_next_in_transition,
            timings: None,
        }
    }

    pub fn id(&self) -> &PartId {
        &self.id
    }

    pub fn segment_id(&self) -> &SegmentId {
        &self.segment_id
    }

    pub fn rank(&self) -> f64 {
        self.rank
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_on_air(&self) -> bool {
        self.is_on_air
    }

    pub fn is_next(&self) -> bool {
        self.is_next
    }

    pub fn expected_duration(&self) -> u64 {
        self.expected_duration
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn in_transition(&self) -> Option<&InTransition> {
        self.in_transition.as_ref()
    }

    pub fn out_transition(&self) -> Option<&OutTransition> {
        self.out_transition.as_ref()
    }

    pub fn auto_next(&self) -> Option<&AutoNext> {
        self.auto_next.as_ref()
    }

    pub fn disable_next_in_transition(&self) -> bool {
        self.disable_next_in_transition
    }

    pub fn put_on_air(&mut self) {
        self.is_on_air = true;
    }

    pub fn take_off_air(&mut self) {
        self.is_on_air = false;
    }

    pub fn set_as_next(&mut self) {
        self.is_next = true;
    }

    pub fn remove_as_next(&mut self) {
        self.is_next = false;
    }

    pub(crate) fn piece_mut(&mut self, id: &PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|piece| piece.id() == id)
    }

    /// Largest pre-roll of any piece, or 0.
    pub fn own_pre_roll(&self) -> u64 {
        self.pieces
            .iter()
            .map(Piece::pre_roll_duration)
            .max()
            .unwrap_or(0)
    }

    /// Largest post-roll of the open-ended pieces, or 0.
    ///
    /// Pieces with a duration end on their own and never hold up the next
    /// part.
    pub fn own_post_roll(&self) -> u64 {
        self.pieces
            .iter()
            .filter(|piece| piece.duration() == 0)
            .map(Piece::post_roll_duration)
            .max()
            .unwrap_or(0)
    }

    /// Compute and store the transition timings into this part.
    pub fn calculate_timings(&mut self, previous: Option<&dyn PrecedingPart>) -> &PartTimings {
        let timings = timings::calculate(
            self.own_pre_roll(),
            self.own_post_roll(),
            self.in_transition.as_ref(),
            previous,
        );
        tracing::trace!(part = %self.id, ?timings, "calculated part timings");
        self.timings.insert(timings)
    }

    /// Timings from the last [`calculate_timings`](Self::calculate_timings).
    pub fn timings(&self) -> Result<&PartTimings> {
        self.timings
            .as_ref()
            .ok_or_else(|| Error::TimingsNotCalculated(self.id.clone()))
    }

    /// Forget stored timings. Called when the preceding part changes.
    pub fn invalidate_timings(&mut self) {
        self.timings = None;
    }
}

impl PrecedingPart for Part {
    fn out_transition(&self) -> Option<&OutTransition> {
        Part::out_transition(self)
    }

    fn auto_next(&self) -> Option<&AutoNext> {
        Part::auto_next(self)
    }

    fn disable_next_in_transition(&self) -> bool {
        Part::disable_next_in_transition(self)
    }

    fn post_roll_duration(&self) -> u64 {
        self.timings.map_or(0, |t| t.post_roll_duration)
    }
}
