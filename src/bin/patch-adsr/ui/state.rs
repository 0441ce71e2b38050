//! Shared state types for UI communication

use patch_adsr::{
    dsp::{EnvelopeConfig, EnvelopeParams, Stage},
    registry::EnvParam,
};

/// Per-block update sent from the audio thread (allocation-free, Copy)
#[derive(Clone, Copy, Debug)]
pub struct ScopeFrame {
    /// Block start time in seconds
    pub time: f64,
    /// Envelope gain for the block
    pub gain: f32,
    pub stage: Stage,
}

/// UI-side mirror of the unit's controls
#[derive(Clone, Copy, Debug)]
pub struct UnitView {
    pub config: EnvelopeConfig,
    pub params: EnvelopeParams,
    pub gate_open: bool,
    pub sample_rate: f32,
}

impl UnitView {
    pub fn new(config: EnvelopeConfig, params: EnvelopeParams, sample_rate: f32) -> Self {
        Self {
            config,
            params,
            gate_open: false,
            sample_rate,
        }
    }

    /// Shift a parameter within its declared bounds, returning the new value
    pub fn nudge(&mut self, param: EnvParam, delta: f32) -> f32 {
        let value = param
            .descriptor()
            .clamp(param.get(&self.params) + delta);
        param.set(&mut self.params, value);
        value
    }
}
