use crate::dsp::envelope::Stage;

/*
Gate Edge Detection
===================

The envelope is driven by a control-rate gate signal: 1.0 means "note
held", 0.0 means "note released". The detector looks at one block at a
time and only cares about transitions between blocks.

  gate   ──┐     ┌───────────┐        ┌──
           │     │           │        │
           └─────┘           └────────┘
  block  |  A  |  B  |  C  |  D  |  E  |
                 ^on               ^off

Classification is deliberately coarse: a block is "on" only if every
single sample equals 1.0. A block where the gate rises halfway through
reads as "off", and the edge shows up one block later. Edges are
therefore quantized to block boundaries, which is fine at control rate.

  [1, 1, 1, 1]   on
  [1, 1, 0, 1]   off  (one low sample is enough)
  [0.5, ...]     off


Timestamps
----------

The detector remembers the absolute time of the last on-edge and the
last off-edge. Both start at negative infinity ("never triggered").

One guard matters: an off-edge that arrives while the envelope is
already releasing does NOT move the off timestamp. Otherwise a release
that began automatically (sustain hold disabled) would restart from the
gate drop and the tail would be cut or stretched.
*/

/// The gate state remembered between blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerType {
    #[default]
    Off,
    On,
}

/// A detected transition in the gate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEdge {
    On,
    Off,
}

/// Absolute times (seconds) of the most recent gate edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerTimestamps {
    pub on_time: f64,
    pub off_time: f64,
}

impl Default for TriggerTimestamps {
    fn default() -> Self {
        Self {
            on_time: f64::NEG_INFINITY,
            off_time: f64::NEG_INFINITY,
        }
    }
}

impl TriggerTimestamps {
    /// True once an on-edge has been seen.
    pub fn has_triggered(&self) -> bool {
        self.on_time.is_finite()
    }
}

/// Block-granular gate edge detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateDetector {
    last_trigger_type: TriggerType,
    triggers: TriggerTimestamps,
}

impl GateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `block`, update bookkeeping and report any edge.
    ///
    /// `now` is the start time of the block. `last_stage` is the stage the
    /// envelope was in during the previous block; off-edges are not recorded
    /// while it is `Release`.
    pub fn detect(&mut self, block: &[f32], now: f64, last_stage: Stage) -> Option<GateEdge> {
        let gate_on = is_gate_on(block);

        match (self.last_trigger_type, gate_on) {
            (TriggerType::Off, true) => {
                self.last_trigger_type = TriggerType::On;
                self.triggers.on_time = now;
                Some(GateEdge::On)
            }
            (TriggerType::On, false) => {
                self.last_trigger_type = TriggerType::Off;
                if last_stage != Stage::Release {
                    self.triggers.off_time = now;
                }
                Some(GateEdge::Off)
            }
            _ => None,
        }
    }

    /// Whether the gate was classified "on" in the last detected block.
    pub fn is_on(&self) -> bool {
        self.last_trigger_type == TriggerType::On
    }

    pub fn last_trigger_type(&self) -> TriggerType {
        self.last_trigger_type
    }

    pub fn triggers(&self) -> TriggerTimestamps {
        self.triggers
    }

    /// Forget all edges (back to "never triggered").
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A block is "on" only when every sample is exactly 1.0.
///
/// An empty block is vacuously on; callers treat empty gate input as "no
/// input" before it reaches the detector.
#[inline]
pub fn is_gate_on(block: &[f32]) -> bool {
    block.iter().all(|&sample| sample == 1.0)
}
