//! Hand-written builders shared by the integration tests.
//!
//! Parts and segments get their rank from their position, so a fixture reads
//! top to bottom in playback order.

#![allow(dead_code)]

use onair_core::{
    PartId, PartInterface, PieceId, PieceInterface, PieceLifespan, Rundown, RundownId,
    RundownInterface, SegmentId, SegmentInterface,
};

pub const RUNDOWN: &str = "evening-news";

/// A piece on `layer` with the given lifespan. Its `part_id` is filled in by
/// [`part`].
pub fn piece(id: &str, layer: &str, lifespan: PieceLifespan) -> PieceInterface {
    PieceInterface {
        id: PieceId::from(id),
        name: id.to_uppercase(),
        layer: layer.into(),
        piece_lifespan: lifespan,
        ..Default::default()
    }
}

pub fn part(id: &str, pieces: Vec<PieceInterface>) -> PartInterface {
    PartInterface {
        id: PartId::from(id),
        name: id.to_uppercase(),
        pieces: pieces
            .into_iter()
            .map(|piece| PieceInterface {
                part_id: PartId::from(id),
                ..piece
            })
            .collect(),
        ..Default::default()
    }
}

pub fn segment(id: &str, parts: Vec<PartInterface>) -> SegmentInterface {
    SegmentInterface {
        id: SegmentId::from(id),
        rundown_id: RundownId::from(RUNDOWN),
        name: id.to_uppercase(),
        rank: 0.0,
        parts: parts
            .into_iter()
            .enumerate()
            .map(|(rank, part)| PartInterface {
                segment_id: SegmentId::from(id),
                rank: rank as f64,
                ..part
            })
            .collect(),
        ..Default::default()
    }
}

/// An inactive rundown over `segments`, ranked in the given order.
pub fn rundown(segments: Vec<SegmentInterface>) -> Rundown {
    let segments = segments
        .into_iter()
        .enumerate()
        .map(|(rank, segment)| SegmentInterface {
            rank: rank as f64,
            ..segment
        })
        .collect();

    Rundown::new(RundownInterface {
        id: RundownId::from(RUNDOWN),
        name: "Evening News".into(),
        segments,
        ..Default::default()
    })
    .expect("fixture rundown is valid")
}

/// Activated at t=1000.
pub fn on_air(segments: Vec<SegmentInterface>) -> Rundown {
    let mut rundown = rundown(segments);
    rundown.activate(1_000).expect("fixture rundown activates");
    rundown
}

/// Ids of the current infinite pieces, sorted.
pub fn infinite_ids(rundown: &Rundown) -> Vec<String> {
    let mut ids: Vec<String> = rundown
        .infinite_pieces()
        .iter()
        .map(|piece| piece.id().to_string())
        .collect();
    ids.sort();
    ids
}

/// `executed_at` of the piece `piece_id` in part `part_id`.
pub fn executed_at(rundown: &Rundown, part_id: &str, piece_id: &str) -> i64 {
    rundown
        .part(&PartId::from(part_id))
        .expect("part exists")
        .pieces()
        .iter()
        .find(|piece| piece.id().as_str() == piece_id)
        .expect("piece exists")
        .executed_at()
}
