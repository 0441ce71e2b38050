//! Construction-time errors.
//!
//! The per-block processing path never fails; everything here is reported
//! while a unit or host is being set up.

use thiserror::Error;

/// Result type for envelope unit setup.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvelopeError {
    /// Curve mode option not recognised.
    #[error("unknown curve mode '{value}' (expected linear, exponential or logarithmic)")]
    UnknownCurveMode { value: String },

    /// Parameter name not part of the unit's schema.
    #[error("unknown envelope parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate { rate: f32 },

    #[error("invalid block size {size} (must be between 1 and {max})")]
    InvalidBlockSize { size: usize, max: usize },
}
