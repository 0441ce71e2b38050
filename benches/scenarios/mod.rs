//! Benchmarks for real-world patch scenarios.

mod units;

pub use units::bench_units;
