//! Which piece occupies each layer after a take.
//!
//! [`resolve`] only reads the rundown structure. The caller applies the
//! returned [`Resolution`], so a failed resolution never leaves the rundown
//! half updated.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::ids::{PartId, PieceId};
use crate::piece::Piece;
use crate::segment::Segment;

/// Arena address of a piece: the part it declares plus its own id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PieceRef {
    pub part_id: PartId,
    pub piece_id: PieceId,
}

impl PieceRef {
    pub fn of(piece: &Piece) -> Self {
        Self {
            part_id: piece.part_id().clone(),
            piece_id: piece.id().clone(),
        }
    }
}

/// Outcome of a resolution.
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    /// New layer occupants.
    pub occupants: BTreeMap<String, PieceRef>,
    /// Previous occupants that lost their layer; their `executed_at` resets.
    pub displaced: Vec<PieceRef>,
    /// Occupants that were not on their layer before; their `executed_at` is
    /// stamped.
    pub entering: Vec<PieceRef>,
}

pub(crate) fn find_piece<'a>(segments: &'a [Segment], piece_ref: &PieceRef) -> Option<&'a Piece> {
    segments
        .iter()
        .flat_map(|segment| segment.parts())
        .flat_map(|part| part.pieces())
        .find(|piece| piece.id() == &piece_ref.piece_id && piece.part_id() == &piece_ref.part_id)
}

pub(crate) fn find_piece_mut<'a>(
    segments: &'a mut [Segment],
    piece_ref: &PieceRef,
) -> Option<&'a mut Piece> {
    segments
        .iter_mut()
        .flat_map(|segment| segment.parts_mut().iter_mut())
        .find_map(|part| {
            part.piece_mut(&piece_ref.piece_id)
                .filter(|piece| piece.part_id() == &piece_ref.part_id)
        })
}

/// Resolve the layer occupants once `active_part_id` in the segment at
/// `active_segment_index` is on air.
///
/// `left_segment_index` is the segment that was on air before the take, set
/// only when the take changes segment.
///
/// Claim order, first claim wins a layer:
/// 1. infinite pieces of the active part;
/// 2. spanning pieces found looking back through the active segment;
/// 3. after a segment change, rundown-spanning pieces of the segments being
///    passed, nearest segment first;
/// 4. previous occupants whose scope still holds.
pub(crate) fn resolve(
    segments: &[Segment],
    previous: &BTreeMap<String, PieceRef>,
    active_segment_index: usize,
    active_part_id: &PartId,
    left_segment_index: Option<usize>,
) -> Result<Resolution> {
    let active_segment = segments
        .get(active_segment_index)
        .ok_or_else(|| Error::not_found("segment", active_segment_index))?;
    let active_part = active_segment.find_part(active_part_id)?;

    let mut occupants: BTreeMap<String, &Piece> = BTreeMap::new();

    for piece in active_part
        .pieces()
        .iter()
        .filter(|piece| piece.piece_lifespan().is_infinite())
    {
        tracing::trace!(layer = piece.layer(), piece = %piece.id(), "claimed by active part");
        occupants.insert(piece.layer().to_owned(), piece);
    }

    let claimed = claimed_layers(&occupants);
    for piece in active_segment.first_spanning_piece_for_each_layer_before_part(active_part, &claimed)? {
        tracing::trace!(layer = piece.layer(), piece = %piece.id(), "claimed by segment look-behind");
        occupants.insert(piece.layer().to_owned(), piece);
    }

    if let Some(left) = left_segment_index {
        for index in passed_segments(left, active_segment_index) {
            let segment = segments
                .get(index)
                .ok_or_else(|| Error::not_found("segment", index))?;
            let claimed = claimed_layers(&occupants);
            for piece in segment.first_spanning_rundown_piece_for_each_layer_for_all_parts(&claimed) {
                tracing::trace!(
                    layer = piece.layer(),
                    piece = %piece.id(),
                    segment = %segment.id(),
                    "claimed by rundown look-behind"
                );
                occupants.insert(piece.layer().to_owned(), piece);
            }
        }
    }

    for piece_ref in previous.values() {
        let piece = find_piece(segments, piece_ref)
            .ok_or_else(|| Error::not_found("piece", &piece_ref.piece_id))?;
        if occupants.contains_key(piece.layer()) {
            continue;
        }
        if keeps_layer(piece, active_segment) {
            occupants.insert(piece.layer().to_owned(), piece);
        }
    }

    let occupants: BTreeMap<String, PieceRef> = occupants
        .into_iter()
        .map(|(layer, piece)| (layer, PieceRef::of(piece)))
        .collect();

    let displaced = previous
        .iter()
        .filter(|(layer, piece_ref)| occupants.get(layer.as_str()) != Some(*piece_ref))
        .map(|(_, piece_ref)| piece_ref.clone())
        .collect();

    let entering = occupants
        .iter()
        .filter(|(layer, piece_ref)| previous.get(layer.as_str()) != Some(*piece_ref))
        .map(|(_, piece_ref)| piece_ref.clone())
        .collect();

    Ok(Resolution {
        occupants,
        displaced,
        entering,
    })
}

/// Indices of the segments passed when moving from `left` to `active`,
/// nearest to `active` first: every segment skipped in between, then the one
/// left. Moving backwards passes only the segment left.
fn passed_segments(left: usize, active: usize) -> Vec<usize> {
    if left < active {
        (left..active).rev().collect()
    } else {
        vec![left]
    }
}

/// Whether a previous occupant keeps its layer with `active_segment` on air.
fn keeps_layer(piece: &Piece, active_segment: &Segment) -> bool {
    let lifespan = piece.piece_lifespan();
    if lifespan.survives_segment_change() {
        return true;
    }
    lifespan.is_infinite() && active_segment.does_piece_belong_to_segment(piece)
}

fn claimed_layers(occupants: &BTreeMap<String, &Piece>) -> HashSet<String> {
    occupants.keys().cloned().collect()
}
