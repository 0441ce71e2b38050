//! Benchmarks for gate classification.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patch_adsr::dsp::gate::is_gate_on;

use crate::BLOCK_SIZES;

pub fn bench_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/gate");

    for &size in BLOCK_SIZES {
        // Worst case: every sample has to be checked
        let high = vec![1.0f32; size];
        group.bench_with_input(BenchmarkId::new("held", size), &size, |b, _| {
            b.iter(|| is_gate_on(black_box(&high)))
        });

        // Early exit on the first low sample
        let low = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("released", size), &size, |b, _| {
            b.iter(|| is_gate_on(black_box(&low)))
        });
    }

    group.finish();
}
