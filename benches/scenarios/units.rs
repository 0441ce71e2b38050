//! Benchmarks for many envelope units in one graph.
//!
//! A patch typically has one envelope per voice; this renders a bank of
//! them per block, each with its own gate pattern and curve.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patch_adsr::{
    dsp::{CurveMode, EnvelopeConfig, EnvelopeParams},
    graph::{EnvNode, GateEvent, GateNode, GraphNode},
    runtime::Transport,
};

use crate::BLOCK_SIZES;

const UNITS: usize = 64;

fn bank() -> Vec<EnvNode<GateNode>> {
    (0..UNITS)
        .map(|i| {
            let offset = i as f64 * 0.01;
            let gate = GateNode::scripted(
                (0..1_000)
                    .flat_map(|n| {
                        let start = offset + n as f64 * 0.5;
                        [GateEvent::open(start), GateEvent::close(start + 0.3)]
                    })
                    .collect(),
            );
            let config = EnvelopeConfig::new(i % 2 == 0, CurveMode::ALL[i % 3]);
            EnvNode::new(gate, config).with_params(EnvelopeParams::adsr(0.05, 0.1, 0.6, 0.2))
        })
        .collect()
}

pub fn bench_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/units");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut units = bank();
        let mut transport = Transport::new(48_000.0, size).expect("bench transport");

        group.bench_with_input(BenchmarkId::new("bank_64", size), &size, |b, _| {
            b.iter(|| {
                let ctx = transport.ctx();
                for unit in units.iter_mut() {
                    unit.render_block(black_box(&mut buffer), &ctx);
                }
                transport.advance(size);
            })
        });
    }

    group.finish();
}
