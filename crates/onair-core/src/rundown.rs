//! The rundown aggregate: on-air/next pointers, take-next and the
//! rundown-wide infinite piece map.
//!
//! Segments, parts and pieces live in one owned tree. Pointers are ids and
//! every lookup is a scan over that tree, so no entity ever holds a reference
//! to its owner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::ids::{PartId, PieceId, RundownId, SegmentId};
use crate::infinite::{self, PieceRef, Resolution};
use crate::part::Part;
use crate::piece::{Piece, TimelineObject, Timestamp};
use crate::segment::{Segment, SegmentInterface};
use crate::timings::{AutoNext, OutTransition, PartTimings, PrecedingPart};

/// Plain construction data for a [`Rundown`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RundownInterface {
    pub id: RundownId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub segments: Vec<SegmentInterface>,
    #[serde(default)]
    pub active_part_id: Option<PartId>,
    #[serde(default)]
    pub next_part_id: Option<PartId>,
    #[serde(default)]
    pub previous_part_id: Option<PartId>,
    #[serde(default)]
    pub active_segment_id: Option<SegmentId>,
    #[serde(default)]
    pub next_segment_id: Option<SegmentId>,
    /// Layer to piece id.
    #[serde(default)]
    pub infinite_pieces: BTreeMap<String, PieceId>,
    #[serde(default)]
    pub baseline: Vec<TimelineObject>,
    #[serde(default)]
    pub modified: Timestamp,
}

/// Aggregate root of the playback state machine.
#[derive(Debug, Clone)]
pub struct Rundown {
    id: RundownId,
    name: String,
    is_active: bool,
    segments: Vec<Segment>,
    active_part: Option<PartId>,
    next_part: Option<PartId>,
    previous_part: Option<PartId>,
    active_segment: Option<SegmentId>,
    next_segment: Option<SegmentId>,
    infinite_pieces: BTreeMap<String, PieceRef>,
    baseline: Vec<TimelineObject>,
    modified: Timestamp,
}

impl Rundown {
    /// Build a rundown from persisted data.
    ///
    /// An active rundown must name its active and next part and segment.
    /// Every pointer and infinite piece must resolve inside `segments`.
    pub fn new(interface: RundownInterface) -> Result<Self> {
        let mut segments: Vec<Segment> = interface.segments.into_iter().map(Segment::new).collect();
        segments.sort_by(|a, b| a.rank().total_cmp(&b.rank()));

        let mut rundown = Self {
            id: interface.id,
            name: interface.name,
            is_active: interface.is_active,
            segments,
            active_part: None,
            next_part: None,
            previous_part: None,
            active_segment: None,
            next_segment: None,
            infinite_pieces: BTreeMap::new(),
            baseline: interface.baseline,
            modified: interface.modified,
        };

        if interface.is_active {
            let active_part = rundown.require(interface.active_part_id, "active_part_id")?;
            let next_part = rundown.require(interface.next_part_id, "next_part_id")?;
            let active_segment = rundown.require(interface.active_segment_id, "active_segment_id")?;
            let next_segment = rundown.require(interface.next_segment_id, "next_segment_id")?;

            rundown.check_part_in_segment(&active_part, &active_segment)?;
            rundown.check_part_in_segment(&next_part, &next_segment)?;

            rundown.active_part = Some(active_part);
            rundown.next_part = Some(next_part);
            rundown.active_segment = Some(active_segment);
            rundown.next_segment = Some(next_segment);
        }

        if let Some(previous_part) = interface.previous_part_id {
            rundown.part(&previous_part).map_err(|_| {
                Error::invalid_construction(format!(
                    "previous part {previous_part} is not part of rundown {}",
                    rundown.id
                ))
            })?;
            rundown.previous_part = Some(previous_part);
        }

        for (layer, piece_id) in &interface.infinite_pieces {
            let piece = rundown.find_piece_by_id(piece_id).ok_or_else(|| {
                Error::invalid_construction(format!(
                    "infinite piece {piece_id} on layer {layer} is not part of rundown {}",
                    rundown.id
                ))
            })?;
            let resolved_layer = piece.layer().to_owned();
            let entry = PieceRef::of(piece);
            if let Some(existing) = rundown.infinite_pieces.get(&resolved_layer) {
                return Err(Error::invalid_construction(format!(
                    "infinite pieces {} and {piece_id} both occupy layer {resolved_layer} of rundown {}",
                    existing.piece_id, rundown.id
                )));
            }
            rundown.infinite_pieces.insert(resolved_layer, entry);
        }

        Ok(rundown)
    }

    fn require<T>(&self, value: Option<T>, field: &str) -> Result<T> {
        value.ok_or_else(|| {
            Error::invalid_construction(format!("active rundown {} is missing {field}", self.id))
        })
    }

    fn check_part_in_segment(&self, part_id: &PartId, segment_id: &SegmentId) -> Result<()> {
        let segment = self.segment(segment_id).map_err(|_| {
            Error::invalid_construction(format!(
                "segment {segment_id} is not part of rundown {}",
                self.id
            ))
        })?;
        segment.find_part(part_id).map_err(|_| {
            Error::invalid_construction(format!(
                "part {part_id} is not part of segment {segment_id}"
            ))
        })?;
        Ok(())
    }

    fn find_piece_by_id(&self, id: &PieceId) -> Option<&Piece> {
        self.segments
            .iter()
            .flat_map(Segment::parts)
            .flat_map(Part::pieces)
            .find(|piece| piece.id() == id)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &RundownId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: &SegmentId) -> Result<&Segment> {
        self.segments
            .iter()
            .find(|segment| segment.id() == id)
            .ok_or_else(|| Error::not_found("segment", id))
    }

    /// Any part of the rundown, whichever segment holds it.
    pub fn part(&self, id: &PartId) -> Result<&Part> {
        self.segments
            .iter()
            .flat_map(Segment::parts)
            .find(|part| part.id() == id)
            .ok_or_else(|| Error::not_found("part", id))
    }

    pub fn active_part(&self) -> Result<&Part> {
        let id = self.active_part.as_ref().ok_or_else(|| self.not_active())?;
        self.part(id)
    }

    pub fn next_part(&self) -> Option<&Part> {
        self.next_part.as_ref().and_then(|id| self.part(id).ok())
    }

    pub fn previous_part(&self) -> Option<&Part> {
        self.previous_part.as_ref().and_then(|id| self.part(id).ok())
    }

    pub fn active_segment(&self) -> Result<&Segment> {
        let id = self.active_segment.as_ref().ok_or_else(|| self.not_active())?;
        self.segment(id)
    }

    pub fn next_segment(&self) -> Option<&Segment> {
        self.next_segment.as_ref().and_then(|id| self.segment(id).ok())
    }

    /// Current infinite occupants, one per layer, ordered by layer.
    pub fn infinite_pieces(&self) -> Vec<&Piece> {
        self.infinite_pieces
            .values()
            .filter_map(|piece_ref| infinite::find_piece(&self.segments, piece_ref))
            .collect()
    }

    pub fn baseline(&self) -> &[TimelineObject] {
        &self.baseline
    }

    pub fn last_time_modified(&self) -> Timestamp {
        self.modified
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Put the first part of the rundown on air and queue the one after it.
    pub fn activate(&mut self, now: Timestamp) -> Result<()> {
        if self.is_active {
            return Err(Error::AlreadyActive(self.id.clone()));
        }

        let (segment_index, part_id) = self
            .first_playable_part()
            .ok_or_else(|| Error::EmptyRundown(self.id.clone()))?;
        let following = self.part_after(segment_index, &part_id)?;
        let resolution =
            infinite::resolve(&self.segments, &BTreeMap::new(), segment_index, &part_id, None)?;

        let segment_id = self.segments[segment_index].id().clone();
        self.is_active = true;
        self.previous_part = None;
        self.put_on_air(&segment_id, &part_id);
        self.queue(following);
        self.apply(resolution, now);
        self.modified = now;

        tracing::info!(rundown = %self.id, part = %part_id, "rundown activated");
        Ok(())
    }

    /// Take everything off air and forget the infinite pieces.
    pub fn deactivate(&mut self, now: Timestamp) -> Result<()> {
        self.assert_active()?;

        if let Some(id) = self.active_part.take() {
            if let Some(part) = self.part_mut(&id) {
                part.take_off_air();
            }
        }
        if let Some(id) = self.active_segment.take() {
            if let Some(segment) = self.segment_mut(&id) {
                segment.take_off_air();
            }
        }
        self.unqueue();
        self.previous_part = None;

        let occupants = std::mem::take(&mut self.infinite_pieces);
        for piece_ref in occupants.values() {
            if let Some(piece) = infinite::find_piece_mut(&mut self.segments, piece_ref) {
                piece.reset_executed_at();
            }
        }

        self.is_active = false;
        self.modified = now;

        tracing::info!(rundown = %self.id, "rundown deactivated");
        Ok(())
    }

    /// Advance playback: the next part goes on air and the infinite piece
    /// map is recomputed. Nothing changes if this fails.
    pub fn take_next(&mut self, now: Timestamp) -> Result<()> {
        self.assert_active()?;

        let next_part_id = self
            .next_part
            .clone()
            .ok_or_else(|| Error::NoNextPart(self.id.clone()))?;
        let next_segment_id = self
            .next_segment
            .clone()
            .ok_or_else(|| Error::NoNextPart(self.id.clone()))?;
        let active_part_id = self.active_part.clone().ok_or_else(|| self.not_active())?;
        let active_segment_id = self.active_segment.clone().ok_or_else(|| self.not_active())?;

        self.part(&active_part_id)?;
        let left_index = self.segment_index(&active_segment_id)?;
        let segment_index = self.segment_index(&next_segment_id)?;
        let segment_changed = next_segment_id != active_segment_id;
        let following = self.part_after(segment_index, &next_part_id)?;
        let resolution = infinite::resolve(
            &self.segments,
            &self.infinite_pieces,
            segment_index,
            &next_part_id,
            segment_changed.then_some(left_index),
        )?;

        if let Some(part) = self.part_mut(&active_part_id) {
            part.take_off_air();
        }
        if segment_changed {
            if let Some(segment) = self.segment_mut(&active_segment_id) {
                segment.take_off_air();
            }
        }
        self.unqueue();
        self.put_on_air(&next_segment_id, &next_part_id);
        self.previous_part = Some(active_part_id);
        self.queue(following);
        self.apply(resolution, now);
        self.modified = now;

        tracing::debug!(
            rundown = %self.id,
            part = %next_part_id,
            segment = %next_segment_id,
            segment_changed,
            next = ?self.next_part,
            "took next part"
        );
        Ok(())
    }

    /// Queue a specific part as next.
    pub fn set_next(&mut self, segment_id: &SegmentId, part_id: &PartId, now: Timestamp) -> Result<()> {
        self.assert_active()?;
        let segment_index = self.segment_index(segment_id)?;
        self.segments[segment_index].find_part(part_id)?;

        self.unqueue();
        self.queue(Some((segment_index, part_id.clone())));
        self.modified = now;

        tracing::debug!(rundown = %self.id, part = %part_id, segment = %segment_id, "next part set");
        Ok(())
    }

    /// Calculate the timings of the on-air part against the part it replaced.
    pub fn calculate_active_part_timings(&mut self) -> Result<PartTimings> {
        let active_id = self.active_part.clone().ok_or_else(|| self.not_active())?;
        let previous = match &self.previous_part {
            Some(id) => Some(PrecedingSnapshot::of(self.part(id)?)),
            None => None,
        };

        let part = self
            .part_mut(&active_id)
            .ok_or_else(|| Error::not_found("part", &active_id))?;
        let previous = previous.as_ref().map(|snapshot| snapshot as &dyn PrecedingPart);
        Ok(*part.calculate_timings(previous))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn not_active(&self) -> Error {
        Error::NotActive(self.id.clone())
    }

    fn assert_active(&self) -> Result<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(self.not_active())
        }
    }

    fn segment_index(&self, id: &SegmentId) -> Result<usize> {
        self.segments
            .iter()
            .position(|segment| segment.id() == id)
            .ok_or_else(|| Error::not_found("segment", id))
    }

    fn segment_mut(&mut self, id: &SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|segment| segment.id() == id)
    }

    fn part_mut(&mut self, id: &PartId) -> Option<&mut Part> {
        self.segments
            .iter_mut()
            .find_map(|segment| segment.find_part_mut(id).ok())
    }

    fn first_playable_part(&self) -> Option<(usize, PartId)> {
        self.first_playable_part_from(0)
    }

    fn first_playable_part_from(&self, start: usize) -> Option<(usize, PartId)> {
        self.segments
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(index, segment)| {
                segment
                    .find_first_part()
                    .ok()
                    .map(|part| (index, part.id().clone()))
            })
    }

    /// The part played after `part_id`: its successor in the same segment,
    /// else the first part of the next segment that has any.
    fn part_after(&self, segment_index: usize, part_id: &PartId) -> Result<Option<(usize, PartId)>> {
        let segment = &self.segments[segment_index];
        let part = segment.find_part(part_id)?;
        match segment.find_next_part(part) {
            Ok(next) => Ok(Some((segment_index, next.id().clone()))),
            Err(Error::LastPartInSegment { .. }) => Ok(self.first_playable_part_from(segment_index + 1)),
            Err(err) => Err(err),
        }
    }

    fn put_on_air(&mut self, segment_id: &SegmentId, part_id: &PartId) {
        if let Some(segment) = self.segment_mut(segment_id) {
            segment.put_on_air();
        }
        if let Some(part) = self.part_mut(part_id) {
            part.put_on_air();
            part.invalidate_timings();
        }
        self.active_segment = Some(segment_id.clone());
        self.active_part = Some(part_id.clone());
    }

    fn queue(&mut self, next: Option<(usize, PartId)>) {
        let Some((segment_index, part_id)) = next else {
            self.next_part = None;
            self.next_segment = None;
            return;
        };

        let segment = &mut self.segments[segment_index];
        segment.set_as_next();
        let segment_id = segment.id().clone();
        if let Some(part) = self.part_mut(&part_id) {
            part.set_as_next();
        }
        self.next_segment = Some(segment_id);
        self.next_part = Some(part_id);
    }

    fn unqueue(&mut self) {
        if let Some(id) = self.next_part.take() {
            if let Some(part) = self.part_mut(&id) {
                part.remove_as_next();
            }
        }
        if let Some(id) = self.next_segment.take() {
            if let Some(segment) = self.segment_mut(&id) {
                segment.remove_as_next();
            }
        }
    }

    fn apply(&mut self, resolution: Resolution, now: Timestamp) {
        for piece_ref in &resolution.displaced {
            if let Some(piece) = infinite::find_piece_mut(&mut self.segments, piece_ref) {
                tracing::trace!(piece = %piece.id(), layer = piece.layer(), "displaced from layer");
                piece.reset_executed_at();
            }
        }
        for piece_ref in &resolution.entering {
            if let Some(piece) = infinite::find_piece_mut(&mut self.segments, piece_ref) {
                piece.set_executed_at(now);
            }
        }
        self.infinite_pieces = resolution.occupants;
    }
}

/// Copy of the outgoing part's transition surface, so the incoming part can
/// be borrowed mutably while it is timed.
#[derive(Debug, Clone, Copy)]
struct PrecedingSnapshot {
    out_transition: Option<OutTransition>,
    auto_next: Option<AutoNext>,
    disable_next_in_transition: bool,
    post_roll_duration: u64,
}

impl PrecedingSnapshot {
    fn of(part: &Part) -> Self {
        Self {
            out_transition: part.out_transition().copied(),
            auto_next: part.auto_next().copied(),
            disable_next_in_transition: part.disable_next_in_transition(),
            post_roll_duration: PrecedingPart::post_roll_duration(part),
        }
    }
}

impl PrecedingPart for PrecedingSnapshot {
    fn out_transition(&self) -> Option<&OutTransition> {
        self.out_transition.as_ref()
    }

    fn auto_next(&self) -> Option<&AutoNext> {
        self.auto_next.as_ref()
    }

    fn disable_next_in_transition(&self) -> bool {
        self.disable_next_in_transition
    }

    fn post_roll_duration(&self) -> u64 {
        self.post_roll_duration
    }
}
