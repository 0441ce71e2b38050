//! Envelope unit primitives.
//!
//! These components are allocation-free and realtime-safe. They stay focused
//! on the per-block math; the graph layer adds gate wiring, parameter
//! clamping and cross-thread control on top.

/// Normalized response curves and their inverses.
pub mod curve;
/// Block-rate ADSR stage machine and gain evaluator.
pub mod envelope;
/// Block-granular gate edge detection.
pub mod gate;

pub use curve::CurveMode;
pub use envelope::{Envelope, EnvelopeConfig, EnvelopeParams, EnvelopeState, Stage};
pub use gate::{GateDetector, TriggerTimestamps};
