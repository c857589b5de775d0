//! An ordered collection of parts and the look-behind searches over it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::ids::{PartId, RundownId, SegmentId};
use crate::lifespan::PieceLifespan;
use crate::part::{Part, PartInterface};
use crate::piece::Piece;

/// Plain construction data for a [`Segment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentInterface {
    pub id: SegmentId,
    pub rundown_id: RundownId,
    #[serde(default)]
    pub name: String,
    pub rank: f64,
    #[serde(default)]
    pub is_on_air: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub parts: Vec<PartInterface>,
}

/// Parts kept sorted ascending by rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    id: SegmentId,
    rundown_id: RundownId,
    name: String,
    rank: f64,
    is_on_air: bool,
    is_next: bool,
    parts: Vec<Part>,
}

impl Segment {
    pub fn new(interface: SegmentInterface) -> Self {
        let mut segment = Self {
            id: interface.id,
            rundown_id: interface.rundown_id,
            name: interface.name,
            rank: interface.rank,
            is_on_air: interface.is_on_air,
            is_next: interface.is_next,
            parts: Vec::new(),
        };
        segment.set_parts(interface.parts.into_iter().map(Part::new).collect());
        segment
    }

    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    pub fn rundown_id(&self) -> &RundownId {
        &self.rundown_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> f64 {
        self.rank
    }

    pub fn is_on_air(&self) -> bool {
        self.is_on_air
    }

    pub fn is_next(&self) -> bool {
        self.is_next
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

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub(crate) fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    /// Replace the parts, sorting them by rank. Equal ranks keep their input
    /// order.
    pub fn set_parts(&mut self, mut parts: Vec<Part>) {
        parts.sort_by(|a, b| a.rank().total_cmp(&b.rank()));
        self.parts = parts;
    }

    pub fn find_first_part(&self) -> Result<&Part> {
        self.parts
            .first()
            .ok_or_else(|| Error::EmptySegment(self.id.clone()))
    }

    /// The part right after `from_part`.
    pub fn find_next_part(&self, from_part: &Part) -> Result<&Part> {
        let index = self.part_index(from_part.id())?;
        self.parts
            .get(index + 1)
            .ok_or_else(|| Error::LastPartInSegment {
                segment_id: self.id.clone(),
                part_id: from_part.id().clone(),
            })
    }

    pub fn find_part(&self, id: &PartId) -> Result<&Part> {
        self.parts
            .iter()
            .find(|part| part.id() == id)
            .ok_or_else(|| Error::not_found("part", id))
    }

    pub(crate) fn find_part_mut(&mut self, id: &PartId) -> Result<&mut Part> {
        self.parts
            .iter_mut()
            .find(|part| part.id() == id)
            .ok_or_else(|| Error::not_found("part", id))
    }

    fn part_index(&self, id: &PartId) -> Result<usize> {
        self.parts
            .iter()
            .position(|part| part.id() == id)
            .ok_or_else(|| Error::not_found("part", id))
    }

    /// Spanning pieces still in effect at `part`, at most one per layer.
    ///
    /// Parts strictly before `part` are scanned nearest first, so the piece
    /// closest to `part` wins its layer. Fails with [`Error::NotFound`] when
    /// `part` is not in this segment.
    pub fn first_spanning_piece_for_each_layer_before_part(
        &self,
        part: &Part,
        layers_to_ignore: &HashSet<String>,
    ) -> Result<Vec<&Piece>> {
        let end = self.part_index(part.id())?;

        Ok(collect_last_per_layer(
            &self.parts[..end],
            layers_to_ignore,
            PieceLifespan::is_spanning,
        ))
    }

    /// Rundown-spanning pieces of the whole segment, at most one per layer.
    ///
    /// Segment-scoped spanning pieces end with the segment, so only
    /// [`PieceLifespan::SpanningUntilRundownEnd`] is considered.
    pub fn first_spanning_rundown_piece_for_each_layer_for_all_parts(
        &self,
        layers_to_ignore: &HashSet<String>,
    ) -> Vec<&Piece> {
        collect_last_per_layer(&self.parts, layers_to_ignore, |lifespan| {
            lifespan == PieceLifespan::SpanningUntilRundownEnd
        })
    }

    pub fn does_piece_belong_to_segment(&self, piece: &Piece) -> bool {
        self.parts.iter().any(|part| part.id() == piece.part_id())
    }
}

fn collect_last_per_layer<'a>(
    parts: &'a [Part],
    layers_to_ignore: &HashSet<String>,
    accept: impl Fn(PieceLifespan) -> bool,
) -> Vec<&'a Piece> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut pieces = Vec::new();

    for part in parts.iter().rev() {
        for piece in part.pieces() {
            if !accept(piece.piece_lifespan()) || layers_to_ignore.contains(piece.layer()) {
                continue;
            }
            if seen.insert(piece.layer()) {
                pieces.push(piece);
            }
        }
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ids::PieceId;
    use crate::piece::PieceInterface;

    fn make_piece(id: &str, part: &str, layer: &str, lifespan: PieceLifespan) -> PieceInterface {
        PieceInterface {
            id: PieceId::from(id),
            part_id: PartId::from(part),
            layer: layer.into(),
            piece_lifespan: lifespan,
            ..Default::default()
        }
    }

    fn make_part(id: &str, rank: f64, pieces: Vec<PieceInterface>) -> PartInterface {
        PartInterface {
            id: PartId::from(id),
            segment_id: SegmentId::from("s1"),
            rank,
            pieces,
            ..Default::default()
        }
    }

    fn make_segment(parts: Vec<PartInterface>) -> Segment {
        Segment::new(SegmentInterface {
            id: SegmentId::from("s1"),
            rundown_id: RundownId::from("r1"),
            name: "Headlines".into(),
            rank: 1.0,
            parts,
            ..Default::default()
        })
    }

    fn ids(pieces: &[&Piece]) -> Vec<String> {
        let mut ids: Vec<String> = pieces.iter().map(|p| p.id().to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn parts_are_sorted_by_rank() {
        let segment = make_segment(vec![
            make_part("c", 3.0, vec![]),
            make_part("a", 1.0, vec![]),
            make_part("b", 2.0, vec![]),
        ]);
        let order: Vec<_> = segment.parts().iter().map(|p| p.id().as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn set_parts_resorts() {
        let mut segment = make_segment(vec![]);
        segment.set_parts(vec![
            Part::new(make_part("late", 10.0, vec![])),
            Part::new(make_part("early", -1.5, vec![])),
        ]);
        assert_eq!(segment.parts()[0].id().as_str(), "early");
    }

    #[test]
    fn find_first_part_of_empty_segment_fails() {
        let segment = make_segment(vec![]);
        let err = segment.find_first_part().unwrap_err();
        assert_eq!(err, Error::EmptySegment(SegmentId::from("s1")));
    }

    #[test]
    fn find_next_part_walks_forward() {
        let segment = make_segment(vec![make_part("a", 1.0, vec![]), make_part("b", 2.0, vec![])]);
        let first = segment.find_first_part().unwrap();
        assert_eq!(segment.find_next_part(first).unwrap().id().as_str(), "b");
    }

    #[test]
    fn find_next_part_from_last_fails() {
        let segment = make_segment(vec![make_part("a", 1.0, vec![]), make_part("b", 2.0, vec![])]);
        let last = segment.find_part(&PartId::from("b")).unwrap();
        let err = segment.find_next_part(last).unwrap_err();
        assert!(matches!(err, Error::LastPartInSegment { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidStructuralOperation);
    }

    #[test]
    fn find_part_not_found() {
        let segment = make_segment(vec![make_part("a", 1.0, vec![])]);
        let err = segment.find_part(&PartId::from("zz")).unwrap_err();
        assert_eq!(err.to_string(), "part not found: zz");
    }

    #[test]
    fn spanning_before_part_takes_nearest_per_layer() {
        let segment = make_segment(vec![
            make_part("a", 1.0, vec![make_piece("a1", "a", "gfx", PieceLifespan::SpanningUntilSegmentEnd)]),
            make_part("b", 2.0, vec![make_piece("b1", "b", "gfx", PieceLifespan::SpanningUntilRundownEnd)]),
            make_part("c", 3.0, vec![make_piece("c1", "c", "gfx", PieceLifespan::SpanningUntilSegmentEnd)]),
        ]);
        let part = segment.find_part(&PartId::from("c")).unwrap();
        let found = segment
            .first_spanning_piece_for_each_layer_before_part(part, &HashSet::new())
            .unwrap();
        assert_eq!(ids(&found), vec!["b1"]);
    }

    #[test]
    fn spanning_before_part_skips_sticky_and_ignored_layers() {
        let segment = make_segment(vec![
            make_part(
                "a",
                1.0,
                vec![
                    make_piece("a1", "a", "audio", PieceLifespan::StickyUntilSegmentChange),
                    make_piece("a2", "a", "gfx", PieceLifespan::StartSpanningSegmentThenStickyRundown),
                    make_piece("a3", "a", "cam", PieceLifespan::SpanningUntilSegmentEnd),
                    make_piece("a4", "a", "dve", PieceLifespan::WithinPart),
                ],
            ),
            make_part("b", 2.0, vec![]),
        ]);
        let part = segment.find_part(&PartId::from("b")).unwrap();
        let ignore: HashSet<String> = ["cam".to_string()].into_iter().collect();
        let found = segment
            .first_spanning_piece_for_each_layer_before_part(part, &ignore)
            .unwrap();
        assert_eq!(ids(&found), vec!["a2"]);
    }

    #[test]
    fn spanning_before_first_part_is_empty() {
        let segment = make_segment(vec![make_part(
            "a",
            1.0,
            vec![make_piece("a1", "a", "gfx", PieceLifespan::SpanningUntilRundownEnd)],
        )]);
        let part = segment.find_first_part().unwrap();
        assert!(segment
            .first_spanning_piece_for_each_layer_before_part(part, &HashSet::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn spanning_before_foreign_part_fails() {
        let segment = make_segment(vec![
            make_part("a", 1.0, vec![make_piece("a1", "a", "gfx", PieceLifespan::SpanningUntilRundownEnd)]),
            make_part("b", 2.0, vec![]),
        ]);
        let foreign = Part::new(make_part("zz", 5.0, vec![]));

        let err = segment
            .first_spanning_piece_for_each_layer_before_part(&foreign, &HashSet::new())
            .unwrap_err();

        assert_eq!(err, Error::not_found("part", "zz"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn rundown_spanning_for_all_parts_only_accepts_rundown_end() {
        let segment = make_segment(vec![
            make_part("a", 1.0, vec![make_piece("a1", "a", "gfx", PieceLifespan::SpanningUntilRundownEnd)]),
            make_part(
                "b",
                2.0,
                vec![
                    make_piece("b1", "b", "gfx", PieceLifespan::SpanningUntilSegmentEnd),
                    make_piece("b2", "b", "audio", PieceLifespan::StartSpanningSegmentThenStickyRundown),
                    make_piece("b3", "b", "cam", PieceLifespan::SpanningUntilRundownEnd),
                ],
            ),
        ]);
        let found = segment.first_spanning_rundown_piece_for_each_layer_for_all_parts(&HashSet::new());
        assert_eq!(ids(&found), vec!["a1", "b3"]);
    }

    #[test]
    fn piece_belongs_to_segment_by_part_id() {
        let segment = make_segment(vec![make_part(
            "a",
            1.0,
            vec![make_piece("a1", "a", "gfx", PieceLifespan::WithinPart)],
        )]);
        let owned = &segment.parts()[0].pieces()[0];
        assert!(segment.does_piece_belong_to_segment(owned));

        let stranger = Piece::new(make_piece("x1", "elsewhere", "gfx", PieceLifespan::WithinPart));
        assert!(!segment.does_piece_belong_to_segment(&stranger));
    }
}
