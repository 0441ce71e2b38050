use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

/*
Envelope Response Curves
========================

Every envelope segment is driven by a normalized progress value `t` in
[0, 1]. A curve bends that progress into a normalized level `v` in [0, 1]
before the segment scales it into its own range (0 → 1 for attack,
1 → sustain for decay, start → 0 for release).

  v
  1.0 ┐          ..--''   logarithmic   fast start, slow finish
      │      .-'    __..
      │    .'   _.-'      linear        constant rate
      │   / _.-'   _.'
      │  /.'   _.-'       exponential   slow start, fast finish
  0.0 └─'----''──────────→ t
      0.0               1.0

  linear        v = t
  exponential   v = (10^t - 1) / 9
  logarithmic   v = log10(1 + 9t)

Both nonlinear curves pass through (0, 0) and (1, 1), and they are exact
inverses of each other:

  log10(1 + 9 * (10^t - 1) / 9) = log10(10^t) = t


Why Inverses Matter
-------------------

A release normally travels from the sustain level down to zero in
`release` seconds. When the gate drops early (mid-attack, mid-decay) the
release starts from whatever level the envelope had reached. Running the
full release time from a lower level would make the tail sound slower
than configured, so the release window is shortened by the time the
curve would have needed to travel that far:

  time_factor = value_to_time(start_level)
  window      = release * time_factor

`time_to_value` is the mode's own curve; `value_to_time` is its inverse.
Linear is its own inverse.
*/

/// Response shape applied to every envelope segment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveMode {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
}

impl CurveMode {
    pub const ALL: [CurveMode; 3] = [
        CurveMode::Linear,
        CurveMode::Exponential,
        CurveMode::Logarithmic,
    ];

    /// Map segment progress (0..=1) to a normalized level.
    #[inline]
    pub fn time_to_value(self, t: f32) -> f32 {
        match self {
            CurveMode::Linear => linear(t),
            CurveMode::Exponential => exponential(t),
            CurveMode::Logarithmic => logarithmic(t),
        }
    }

    /// Map a normalized level back to the progress that produces it.
    #[inline]
    pub fn value_to_time(self, v: f32) -> f32 {
        match self {
            CurveMode::Linear => linear(v),
            CurveMode::Exponential => logarithmic(v),
            CurveMode::Logarithmic => exponential(v),
        }
    }

    /// Name used by the host's unit options.
    pub fn as_str(self) -> &'static str {
        match self {
            CurveMode::Linear => "linear",
            CurveMode::Exponential => "exponential",
            CurveMode::Logarithmic => "logarithmic",
        }
    }

    /// Cycle to the next mode (wraps around).
    pub fn next(self) -> Self {
        match self {
            CurveMode::Linear => CurveMode::Exponential,
            CurveMode::Exponential => CurveMode::Logarithmic,
            CurveMode::Logarithmic => CurveMode::Linear,
        }
    }
}

impl fmt::Display for CurveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveMode {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurveMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EnvelopeError::UnknownCurveMode {
                value: s.to_string(),
            })
    }
}

#[inline]
pub fn linear(t: f32) -> f32 {
    t
}

#[inline]
pub fn exponential(t: f32) -> f32 {
    (10.0_f32.powf(t) - 1.0) / 9.0
}

#[inline]
pub fn logarithmic(t: f32) -> f32 {
    (1.0 + 9.0 * t).log10()
}
