//! Transport - the host's block clock
//!
//! Counts frames and hands out one `RenderCtx` per render quantum. Time is
//! derived from the frame counter rather than accumulated, so it does not
//! drift over long sessions.

use crate::{
    error::{EnvelopeError, EnvelopeResult},
    graph::node::RenderCtx,
    MAX_BLOCK_SIZE,
};

/// Block clock for driving graph nodes
#[derive(Debug, Clone)]
pub struct Transport {
    /// Audio sample rate in Hz
    sample_rate: f32,
    /// Frames per render quantum
    block_size: usize,
    /// Frames rendered since start
    frames: u64,
}

impl Transport {
    /// Create a transport starting at time zero
    pub fn new(sample_rate: f32, block_size: usize) -> EnvelopeResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EnvelopeError::InvalidSampleRate { rate: sample_rate });
        }
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(EnvelopeError::InvalidBlockSize {
                size: block_size,
                max: MAX_BLOCK_SIZE,
            });
        }

        tracing::debug!(sample_rate, block_size, "transport created");

        Ok(Self {
            sample_rate,
            block_size,
            frames: 0,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Current time in seconds (start of the next block)
    pub fn time(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    /// Duration of one full block in seconds
    pub fn block_duration(&self) -> f64 {
        self.block_size as f64 / self.sample_rate as f64
    }

    /// Context for the block about to be rendered
    pub fn ctx(&self) -> RenderCtx {
        RenderCtx::new(self.sample_rate, self.time())
    }

    /// Move the clock forward by `frames`
    pub fn advance(&mut self, frames: usize) {
        self.frames += frames as u64;
    }

    /// Back to time zero
    pub fn reset(&mut self) {
        self.frames = 0;
    }
}
