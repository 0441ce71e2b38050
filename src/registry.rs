//! Registration surface of the envelope unit.
//!
//! The graph layer instantiates the unit by [`UNIT_ID`] and builds its
//! parameter controls from [`parameter_descriptors`]. Construction options
//! arrive as [`UnitOptions`], in the shape the host sends them.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        curve::CurveMode,
        envelope::{EnvelopeConfig, EnvelopeParams},
    },
    error::{EnvelopeError, EnvelopeResult},
};

/// Identifier the graph uses to instantiate the envelope unit.
pub const UNIT_ID: &str = "envelope-processor";

/// How often a parameter is sampled.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationRate {
    /// Once per sample.
    ARate,
    /// Once per block.
    KRate,
}

/// The envelope's four parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvParam {
    Attack,
    Decay,
    Release,
    Sustain,
}

impl EnvParam {
    pub const ALL: [EnvParam; 4] = [
        EnvParam::Attack,
        EnvParam::Decay,
        EnvParam::Release,
        EnvParam::Sustain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnvParam::Attack => "attack",
            EnvParam::Decay => "decay",
            EnvParam::Release => "release",
            EnvParam::Sustain => "sustain",
        }
    }

    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMETERS[self as usize]
    }

    /// Read this parameter out of a parameter set.
    pub fn get(self, params: &EnvelopeParams) -> f32 {
        match self {
            EnvParam::Attack => params.attack,
            EnvParam::Decay => params.decay,
            EnvParam::Release => params.release,
            EnvParam::Sustain => params.sustain,
        }
    }

    /// Write this parameter into a parameter set, unclamped.
    pub fn set(self, params: &mut EnvelopeParams, value: f32) {
        match self {
            EnvParam::Attack => params.attack = value,
            EnvParam::Decay => params.decay = value,
            EnvParam::Release => params.release = value,
            EnvParam::Sustain => params.sustain = value,
        }
    }
}

impl fmt::Display for EnvParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnvParam {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvParam::ALL
            .into_iter()
            .find(|param| param.name() == s)
            .ok_or_else(|| EnvelopeError::UnknownParameter {
                name: s.to_string(),
            })
    }
}

/// Declared schema of one parameter, consumed by the editor's controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub param: EnvParam,
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub rate: AutomationRate,
}

impl ParamDescriptor {
    /// Host-side clamping into the declared bounds. NaN falls back to the
    /// default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

// Indexed by `EnvParam as usize`.
static PARAMETERS: [ParamDescriptor; 4] = [
    ParamDescriptor {
        param: EnvParam::Attack,
        name: "attack",
        default: 0.0,
        min: 0.0,
        max: f32::MAX,
        rate: AutomationRate::KRate,
    },
    ParamDescriptor {
        param: EnvParam::Decay,
        name: "decay",
        default: 0.0,
        min: 0.0,
        max: f32::MAX,
        rate: AutomationRate::KRate,
    },
    ParamDescriptor {
        param: EnvParam::Release,
        name: "release",
        default: 0.0,
        min: 0.0,
        max: f32::MAX,
        rate: AutomationRate::KRate,
    },
    ParamDescriptor {
        param: EnvParam::Sustain,
        name: "sustain",
        default: 0.0,
        min: 0.0,
        max: 1.0,
        rate: AutomationRate::KRate,
    },
];

/// The unit's parameter schema.
pub fn parameter_descriptors() -> &'static [ParamDescriptor] {
    &PARAMETERS
}

/// Parameter set holding every declared default.
pub fn default_params() -> EnvelopeParams {
    let mut params = EnvelopeParams::default();
    for descriptor in parameter_descriptors() {
        descriptor.param.set(&mut params, descriptor.default);
    }
    params
}

/// Clamp every field of `params` into its declared bounds.
pub fn clamp_params(params: &EnvelopeParams) -> EnvelopeParams {
    let mut clamped = *params;
    for descriptor in parameter_descriptors() {
        let value = descriptor.param.get(params);
        descriptor.param.set(&mut clamped, descriptor.clamp(value));
    }
    clamped
}

/// Construction options as supplied by the host.
///
/// Missing fields take the unit defaults (sustain on, linear curve). The
/// curve mode stays a string until [`UnitOptions::into_config`] so that a
/// bad value surfaces as a construction error instead of a parse failure
/// deep inside the host's option record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitOptions {
    pub sustain_on: Option<bool>,
    pub mode: Option<String>,
}

impl UnitOptions {
    pub fn new(sustain_on: bool, mode: impl Into<String>) -> Self {
        Self {
            sustain_on: Some(sustain_on),
            mode: Some(mode.into()),
        }
    }

    /// Validate the options into a unit configuration.
    pub fn into_config(self) -> EnvelopeResult<EnvelopeConfig> {
        let defaults = EnvelopeConfig::default();
        let curve = match self.mode.as_deref() {
            Some(mode) => mode.parse::<CurveMode>()?,
            None => defaults.curve,
        };
        let config = EnvelopeConfig::new(self.sustain_on.unwrap_or(defaults.sustain_hold), curve);

        tracing::debug!(
            unit = UNIT_ID,
            sustain_hold = config.sustain_hold,
            curve = %config.curve,
            "envelope options accepted"
        );
        Ok(config)
    }
}

impl TryFrom<UnitOptions> for EnvelopeConfig {
    type Error = EnvelopeError;

    fn try_from(options: UnitOptions) -> Result<Self, Self::Error> {
        options.into_config()
    }
}
