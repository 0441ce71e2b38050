//! Benchmarks for the ADSR envelope engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patch_adsr::dsp::{Envelope, EnvelopeConfig, EnvelopeParams};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let params = EnvelopeParams::adsr(1_000.0, 0.1, 0.7, 1_000.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let on = vec![1.0f32; size];
        let off = vec![0.0f32; size];
        let block = size as f64 / SAMPLE_RATE;

        // Attack phase (long attack keeps it there)
        let mut env = Envelope::new(EnvelopeConfig::default());
        let mut now = 0.0;
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.process(black_box(now), Some(on.as_slice()), &params, black_box(&mut buffer));
                now += block;
            })
        });

        // Sustain phase (holding steady)
        let sustain_params = EnvelopeParams::adsr(0.0, 0.0, 0.7, 1_000.0);
        let mut env = Envelope::new(EnvelopeConfig::default());
        let mut now = 0.0;
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.process(black_box(now), Some(on.as_slice()), &sustain_params, black_box(&mut buffer));
                now += block;
            })
        });

        // Rate-scaled release (gate dropped mid-attack)
        let mut env = Envelope::new(EnvelopeConfig::default());
        env.process(0.0, Some(on.as_slice()), &params, &mut buffer);
        env.process(block, Some(on.as_slice()), &params, &mut buffer);
        let mut now = 2.0 * block;
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.process(black_box(now), Some(off.as_slice()), &params, black_box(&mut buffer));
                now += block;
            })
        });
    }

    group.finish();
}
