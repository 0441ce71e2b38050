//! Benchmarks for response curves.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patch_adsr::dsp::CurveMode;

pub fn bench_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/curve");

    for mode in CurveMode::ALL {
        group.bench_with_input(BenchmarkId::new("time_to_value", mode), &mode, |b, &mode| {
            b.iter(|| mode.time_to_value(black_box(0.37)))
        });
        group.bench_with_input(BenchmarkId::new("value_to_time", mode), &mode, |b, &mode| {
            b.iter(|| mode.value_to_time(black_box(0.37)))
        });
    }

    group.finish();
}
