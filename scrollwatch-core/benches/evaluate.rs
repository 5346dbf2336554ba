//! Microbenchmarks for the per-tick hot path: classification and placement
//! arithmetic, plus the one-time shorthand parse for comparison.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use scrollwatch_core::viewport::classify;
use scrollwatch_core::{Placement, PlacementSpec};

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| classify(black_box(512.0), black_box(800.0), black_box(200.0)))
    });
}

fn bench_placement_resolve(c: &mut Criterion) {
    let placement = Placement {
        percent: 0.5,
        distance: 10.0,
        target_percent: 0.25,
    };
    c.bench_function("placement_resolve", |b| {
        b.iter(|| black_box(placement).resolve(black_box(1000.0), black_box(200.0)))
    });
}

fn bench_shorthand_parse(c: &mut Criterion) {
    c.bench_function("shorthand_parse", |b| {
        b.iter(|| {
            PlacementSpec::from(black_box("bottom - 10px + 25%target"))
                .resolve()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_placement_resolve,
    bench_shorthand_parse
);
criterion_main!(benches);
