//! Benchmarks for low-level DSP primitives.

mod curve;
mod envelope;
mod gate;

pub use curve::bench_curve;
pub use envelope::bench_envelope;
pub use gate::bench_gate;
