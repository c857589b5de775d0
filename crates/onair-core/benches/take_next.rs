//! Benchmark take_next() across rundowns of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use onair_core::{
    PartId, PartInterface, PieceId, PieceInterface, PieceLifespan, Rundown, RundownId,
    RundownInterface, SegmentId, SegmentInterface,
};

const LIFESPANS: [PieceLifespan; 6] = [
    PieceLifespan::WithinPart,
    PieceLifespan::StickyUntilSegmentChange,
    PieceLifespan::SpanningUntilSegmentEnd,
    PieceLifespan::StickyUntilRundownChange,
    PieceLifespan::SpanningUntilRundownEnd,
    PieceLifespan::StartSpanningSegmentThenStickyRundown,
];

/// `segments` segments of `parts` parts, each part with one piece per layer.
fn make_rundown(segments: usize, parts: usize, layers: usize) -> Rundown {
    let segments = (0..segments)
        .map(|s| {
            let segment_id = SegmentId::from(format!("s{s}"));
            SegmentInterface {
                id: segment_id.clone(),
                rundown_id: RundownId::from("bench"),
                rank: s as f64,
                parts: (0..parts)
                    .map(|p| {
                        let part_id = PartId::from(format!("s{s}p{p}"));
                        PartInterface {
                            id: part_id.clone(),
                            segment_id: segment_id.clone(),
                            rank: p as f64,
                            pieces: (0..layers)
                                .map(|l| PieceInterface {
                                    id: PieceId::from(format!("s{s}p{p}l{l}")),
                                    part_id: part_id.clone(),
                                    layer: format!("layer-{l}"),
                                    piece_lifespan: LIFESPANS[(s + p + l) % LIFESPANS.len()],
                                    ..Default::default()
                                })
                                .collect(),
                            ..Default::default()
                        }
                    })
                    .collect(),
                ..Default::default()
            }
        })
        .collect();

    let mut rundown = Rundown::new(RundownInterface {
        id: RundownId::from("bench"),
        segments,
        ..Default::default()
    })
    .unwrap();
    rundown.activate(1).unwrap();
    rundown
}

fn bench_take_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("take_next");

    // Short bulletin: 5 segments of 4 parts.
    let small = make_rundown(5, 4, 4);
    group.bench_function("5seg_4part", |b| {
        b.iter_batched(
            || small.clone(),
            |mut rundown| {
                while rundown.take_next(black_box(2)).is_ok() {}
                rundown
            },
            BatchSize::SmallInput,
        );
    });

    // Long-form show: 30 segments of 10 parts on 12 layers.
    let large = make_rundown(30, 10, 12);
    group.bench_function("30seg_10part", |b| {
        b.iter_batched(
            || large.clone(),
            |mut rundown| {
                while rundown.take_next(black_box(2)).is_ok() {}
                rundown
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_take_next);
criterion_main!(benches);
