#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    curve::CurveMode,
    gate::{GateDetector, TriggerTimestamps},
};

/*
Block-Rate ADSR Envelope
========================

This module implements the envelope generator unit: a gate signal goes
in, a gain value comes out, once per processing block.

Vocabulary
----------

  gain        The envelope's output value (0.0 to 1.0). Every sample of
              the output block carries the same gain.

  stage       Attack, Decay, Sustain or Release. Exactly one holds.

  on_time     Absolute time of the last gate on-edge (seconds).
  off_time    Absolute time of the last recorded gate off-edge.

  now         Start time of the block being rendered. Passed in by the
              host; the engine never reads a clock on its own.

  progress    Position inside the current stage, clamped to [0, 1].
              Shaped by the selected curve (see `dsp/curve.rs`).


The Shape
---------

  Gain
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
          ^on              ^off
        Attack Decay  Sustain  Release


Time, Not Increments
--------------------

Rather than nudging a level up or down every sample, each block asks
"where on the contour should we be at time `now`?". Stage boundaries
come straight from the trigger timestamps:

  attack    [on_time,               on_time + A]
  decay     [on_time + A,           on_time + A + D]
  sustain   after that, while the gate is held
  release   [off_time,              off_time + R * time_factor]

Because every stage is a pure function of `now` and two timestamps, a
block can be evaluated in O(1) with no accumulated rounding drift, and
parameter changes take effect on the very next block.


Picking The Stage
-----------------

Checked in priority order every block:

  1. off_time > on_time                    → Release
  2. A > 0 and now <= on_time + A          → Attack
  3. D > 0 and now <= on_time + A + D      → Decay
  4. sustain_hold and gate is on           → Sustain
  5. otherwise                             → Release

Zero-length attack and decay windows are skipped outright, so a zero
attack never shows an attack frame: the first block after the on-edge is
already in Decay (or Sustain / Release).


Smooth Stage Changes
--------------------

Whenever the stage changes we snapshot the previous block's gain into
`last_gain_at_stage_change`. Release starts from that snapshot rather
than from a nominal level, which keeps an early gate drop click-free.


Rate-Preserving Release
-----------------------

A release that starts from the sustain level takes exactly R seconds.
A release that interrupts attack or decay starts lower (or higher) than
sustain. To keep it sounding like the same release rate, the window is
scaled by the inverse curve of the starting gain:

  time_factor = value_to_time(start_level)     (linear: = start_level)

Example (linear, R = 1s): gate drops mid-attack at gain 0.5. The release
runs from 0.5 to 0 in 0.5 seconds, the same slope a full 1.0 → 0 release
would have.

Which releases count as "early" depends on sustain hold:

  hold on    off_time < on_time + A + D    (dropped before decay ended)
  hold off   off_time > on_time            (any real gate drop)

With hold off and no gate drop, release begins automatically when decay
ends, from the sustain level, with the full R window.


Block-Rate Quantization
-----------------------

The gain is sampled and held once per block. At 48 kHz with 128-frame
blocks that is a 2.7 ms staircase, which is inaudible on an amplitude
envelope and keeps the per-block cost constant.
*/

/// The current stage of the envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Attack,
    Decay,
    Sustain,
    Release,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Attack => "attack",
            Stage::Decay => "decay",
            Stage::Sustain => "sustain",
            Stage::Release => "release",
        }
    }
}

/// Static unit configuration, read live every block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    /// Hold the sustain level while the gate is on. When false the envelope
    /// releases as soon as decay completes.
    pub sustain_hold: bool,
    pub curve: CurveMode,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            sustain_hold: true,
            curve: CurveMode::Linear,
        }
    }
}

impl EnvelopeConfig {
    pub fn new(sustain_hold: bool, curve: CurveMode) -> Self {
        Self {
            sustain_hold,
            curve,
        }
    }
}

/// Per-block parameter values. Durations in seconds, sustain in 0..=1.
///
/// The engine does not validate these; the host clamps them against the
/// declared schema (see `registry`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParams {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Absolute end of the decay window for an envelope triggered at `on_time`.
    #[inline]
    fn decay_end(&self, on_time: f64) -> f64 {
        on_time + self.attack as f64 + self.decay as f64
    }
}

/// Runtime state of one envelope unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeState {
    last_gain: f32,
    last_gain_at_stage_change: f32,
    last_stage: Stage,
    gate: GateDetector,
}

impl EnvelopeState {
    /// Fresh state: Attack stage, zero gain, never triggered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_gain(&self) -> f32 {
        self.last_gain
    }

    pub fn last_gain_at_stage_change(&self) -> f32 {
        self.last_gain_at_stage_change
    }

    pub fn last_stage(&self) -> Stage {
        self.last_stage
    }

    pub fn triggers(&self) -> TriggerTimestamps {
        self.gate.triggers()
    }

    pub fn gate_on(&self) -> bool {
        self.gate.is_on()
    }
}

/// Evaluate one processing block.
///
/// Runs gate detection on `gate`, advances the stage machine to `now`,
/// evaluates the gain and fills `out` with it. Returns `false` when the gate
/// input is absent or empty: the state is left untouched and `out` holds the
/// previous gain.
pub fn process_block(
    state: &mut EnvelopeState,
    now: f64,
    gate: Option<&[f32]>,
    config: &EnvelopeConfig,
    params: &EnvelopeParams,
    out: &mut [f32],
) -> bool {
    let Some(gate) = gate.filter(|block| !block.is_empty()) else {
        out.fill(state.last_gain);
        return false;
    };

    state.gate.detect(gate, now, state.last_stage);

    let stage = next_stage(&state.gate.triggers(), state.gate.is_on(), now, config, params);
    if stage != state.last_stage {
        state.last_gain_at_stage_change = state.last_gain;
        state.last_stage = stage;
    }

    state.last_gain = stage_gain(
        stage,
        &state.gate.triggers(),
        state.last_gain_at_stage_change,
        now,
        config,
        params,
    );
    debug_assert!(state.last_gain.is_finite());

    out.fill(state.last_gain);
    true
}

/// Which stage the envelope is in at `now`.
pub fn next_stage(
    triggers: &TriggerTimestamps,
    gate_on: bool,
    now: f64,
    config: &EnvelopeConfig,
    params: &EnvelopeParams,
) -> Stage {
    let on_time = triggers.on_time;

    if triggers.off_time > on_time {
        return Stage::Release;
    }

    if params.attack > 0.0 && now <= on_time + params.attack as f64 {
        return Stage::Attack;
    }

    if params.decay > 0.0 && now <= params.decay_end(on_time) {
        return Stage::Decay;
    }

    if config.sustain_hold && gate_on {
        return Stage::Sustain;
    }

    Stage::Release
}

/// Gain for `stage` at `now`.
///
/// `stage_change_gain` is the gain the envelope had when it entered the
/// current stage; release uses it as its starting level when it cuts an
/// attack or decay short.
pub fn stage_gain(
    stage: Stage,
    triggers: &TriggerTimestamps,
    stage_change_gain: f32,
    now: f64,
    config: &EnvelopeConfig,
    params: &EnvelopeParams,
) -> f32 {
    let curve = config.curve;
    let on_time = triggers.on_time;
    let off_time = triggers.off_time;

    match stage {
        Stage::Attack => {
            if params.attack <= 0.0 {
                return 1.0;
            }
            let start = on_time;
            let end = start + params.attack as f64;

            // 0 -> 1 (peak)
            curve.time_to_value(progress(now, start, end))
        }

        Stage::Decay => {
            if params.decay <= 0.0 {
                return params.sustain;
            }
            let start = on_time + params.attack as f64;
            let end = start + params.decay as f64;

            // 1 (peak) -> sustain
            1.0 - (1.0 - params.sustain) * curve.time_to_value(progress(now, start, end))
        }

        Stage::Sustain => params.sustain,

        Stage::Release => {
            if params.release <= 0.0 {
                return 0.0;
            }

            let decay_end = params.decay_end(on_time);
            let (triggered, start) = if config.sustain_hold {
                (off_time < decay_end, off_time)
            } else {
                let triggered = off_time > on_time;
                (triggered, if triggered { off_time } else { decay_end })
            };

            let (time_factor, start_level) = if triggered {
                (curve.value_to_time(stage_change_gain), stage_change_gain)
            } else {
                (1.0, params.sustain)
            };

            let end = start + params.release as f64 * time_factor as f64;

            // start_level -> 0
            (1.0 - curve.time_to_value(progress(now, start, end))) * start_level
        }
    }
}

/// Normalized position of `now` inside `[start, end]`.
///
/// A window that starts at negative infinity (never triggered) or has no
/// positive width counts as already finished.
#[inline]
fn progress(now: f64, start: f64, end: f64) -> f32 {
    let span = end - start;
    if !start.is_finite() || !(span > 0.0) {
        return 1.0;
    }
    ((now - start) / span).clamp(0.0, 1.0) as f32
}

/// An envelope unit: configuration plus state.
///
/// Thin convenience over [`process_block`] for callers that do not want to
/// carry the two pieces separately.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    config: EnvelopeConfig,
    state: EnvelopeState,
}

impl Envelope {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            config,
            state: EnvelopeState::new(),
        }
    }

    /// Render one block. See [`process_block`].
    pub fn process(
        &mut self,
        now: f64,
        gate: Option<&[f32]>,
        params: &EnvelopeParams,
        out: &mut [f32],
    ) -> bool {
        process_block(&mut self.state, now, gate, &self.config, params, out)
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Configuration changes apply from the next block on, including to an
    /// envelope that is mid-release.
    pub fn config_mut(&mut self) -> &mut EnvelopeConfig {
        &mut self.config
    }

    pub fn state(&self) -> &EnvelopeState {
        &self.state
    }

    /// Current gain (0.0 to 1.0).
    pub fn level(&self) -> f32 {
        self.state.last_gain
    }

    pub fn stage(&self) -> Stage {
        self.state.last_stage
    }

    /// Back to the freshly constructed state.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON: [f32; 8] = [1.0; 8];
    const OFF: [f32; 8] = [0.0; 8];
    const EPS: f32 = 1e-4;

    fn scenario_params() -> EnvelopeParams {
        EnvelopeParams::adsr(1.0, 1.0, 0.5, 1.0)
    }

    fn step(env: &mut Envelope, now: f64, gate: &[f32], params: &EnvelopeParams) -> f32 {
        let mut out = [0.0; 8];
        env.process(now, Some(gate), params, &mut out);
        assert!(out.iter().all(|&s| s == out[0]), "block must hold one value");
        out[0]
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn untriggered_envelope_is_silent() {
        let mut env = Envelope::default();
        let params = scenario_params();

        assert_eq!(step(&mut env, 0.0, &OFF, &params), 0.0);
        assert_eq!(env.stage(), Stage::Release);
        assert_eq!(step(&mut env, 5.0, &OFF, &params), 0.0);
    }

    #[test]
    fn attack_starts_at_zero_and_peaks_at_one() {
        let params = scenario_params();
        for curve in CurveMode::ALL {
            let mut env = Envelope::new(EnvelopeConfig::new(true, curve));

            assert_close(step(&mut env, 10.0, &ON, &params), 0.0);
            assert_eq!(env.stage(), Stage::Attack);

            assert_close(step(&mut env, 11.0, &ON, &params), 1.0);
            assert_eq!(env.stage(), Stage::Attack);
        }
    }

    #[test]
    fn zero_attack_skips_straight_to_decay() {
        let params = EnvelopeParams::adsr(0.0, 1.0, 0.5, 1.0);
        let mut env = Envelope::default();

        let gain = step(&mut env, 0.0, &ON, &params);
        assert_eq!(env.stage(), Stage::Decay);
        assert_close(gain, 1.0);
    }

    #[test]
    fn zero_attack_and_decay_jump_to_sustain() {
        let params = EnvelopeParams::adsr(0.0, 0.0, 0.7, 1.0);
        let mut env = Envelope::default();

        let gain = step(&mut env, 0.0, &ON, &params);
        assert_eq!(env.stage(), Stage::Sustain);
        assert_close(gain, 0.7);
    }

    #[test]
    fn zero_attack_and_decay_without_hold_release_immediately() {
        let params = EnvelopeParams::adsr(0.0, 0.0, 0.7, 1.0);
        let mut env = Envelope::new(EnvelopeConfig::new(false, CurveMode::Linear));

        let gain = step(&mut env, 0.0, &ON, &params);
        assert_eq!(env.stage(), Stage::Release);
        assert_close(gain, 0.7);
        assert_close(step(&mut env, 0.5, &ON, &params), 0.35);
    }

    #[test]
    fn decay_falls_monotonically_to_sustain() {
        let params = scenario_params();
        for curve in CurveMode::ALL {
            let mut env = Envelope::new(EnvelopeConfig::new(true, curve));
            step(&mut env, 0.0, &ON, &params);

            let mut previous = f32::INFINITY;
            for i in 1..=20 {
                let now = 1.0 + i as f64 * 0.05;
                let gain = step(&mut env, now, &ON, &params);
                assert_eq!(env.stage(), Stage::Decay, "{curve} at {now}");
                assert!(gain <= previous + EPS, "{curve}: {gain} after {previous}");
                assert!((0.5 - EPS..=1.0 + EPS).contains(&gain));
                previous = gain;
            }
            assert_close(previous, 0.5);

            assert_close(step(&mut env, 2.5, &ON, &params), 0.5);
            assert_eq!(env.stage(), Stage::Sustain);
        }
    }

    #[test]
    fn early_release_is_rate_scaled() {
        let params = scenario_params();
        let mut env = Envelope::default();

        step(&mut env, 0.0, &ON, &params);
        assert_close(step(&mut env, 0.5, &ON, &params), 0.5);

        // Gate drops mid-attack.
        let gain = step(&mut env, 0.5, &OFF, &params);
        assert_eq!(env.stage(), Stage::Release);
        assert_close(env.state().last_gain_at_stage_change(), 0.5);
        assert_close(gain, 0.5);

        assert_close(step(&mut env, 0.75, &OFF, &params), 0.25);
        assert_close(step(&mut env, 1.0, &OFF, &params), 0.0);
        assert_close(step(&mut env, 1.5, &OFF, &params), 0.0);
    }

    #[test]
    fn release_from_sustain_takes_full_release_time() {
        let params = scenario_params();
        let mut env = Envelope::default();

        step(&mut env, 0.0, &ON, &params);
        assert_close(step(&mut env, 3.0, &ON, &params), 0.5);
        assert_eq!(env.stage(), Stage::Sustain);

        assert_close(step(&mut env, 3.0, &OFF, &params), 0.5);
        assert_close(step(&mut env, 3.5, &OFF, &params), 0.25);
        assert_close(step(&mut env, 3.75, &OFF, &params), 0.125);
        assert_close(step(&mut env, 4.0, &OFF, &params), 0.0);
    }

    #[test]
    fn exponential_early_release_uses_inverse_curve() {
        let params = scenario_params();
        let config = EnvelopeConfig::new(true, CurveMode::Exponential);
        let mut env = Envelope::new(config);

        step(&mut env, 0.0, &ON, &params);
        let peak = step(&mut env, 0.5, &ON, &params);
        assert_close(peak, crate::dsp::curve::exponential(0.5));

        step(&mut env, 0.5, &OFF, &params);
        let factor = crate::dsp::curve::logarithmic(peak) as f64;
        let end = 0.5 + factor;
        assert_close(step(&mut env, end, &OFF, &params), 0.0);
        assert!(step(&mut env, 0.5 + factor * 0.5, &OFF, &params) > 0.0);
    }

    #[test]
    fn without_sustain_hold_release_follows_decay() {
        let params = EnvelopeParams::adsr(0.1, 0.1, 0.5, 1.0);
        let mut env = Envelope::new(EnvelopeConfig::new(false, CurveMode::Linear));

        step(&mut env, 0.0, &ON, &params);
        let gain = step(&mut env, 0.7, &ON, &params);
        assert_eq!(env.stage(), Stage::Release);
        assert_close(gain, 0.25);

        // Gate drop during the automatic release neither records an off-edge
        // nor restarts the tail.
        let gain = step(&mut env, 0.9, &OFF, &params);
        assert_eq!(env.state().triggers().off_time, f64::NEG_INFINITY);
        assert_close(gain, 0.15);
        assert_close(step(&mut env, 1.2, &OFF, &params), 0.0);
    }

    #[test]
    fn without_sustain_hold_gate_drop_releases_from_current_gain() {
        let params = EnvelopeParams::adsr(1.0, 1.0, 0.5, 1.0);
        let mut env = Envelope::new(EnvelopeConfig::new(false, CurveMode::Linear));

        step(&mut env, 0.0, &ON, &params);
        let gain = step(&mut env, 1.5, &ON, &params);
        assert_eq!(env.stage(), Stage::Decay);
        assert_close(gain, 0.75);

        step(&mut env, 1.5, &OFF, &params);
        assert_eq!(env.stage(), Stage::Release);
        // Window is 0.75s long, starting at 0.75.
        assert_close(step(&mut env, 1.875, &OFF, &params), 0.375);
        assert_close(step(&mut env, 2.25, &OFF, &params), 0.0);
    }

    #[test]
    fn retrigger_during_release_restarts_attack() {
        let params = scenario_params();
        let mut env = Envelope::default();

        step(&mut env, 0.0, &ON, &params);
        step(&mut env, 3.0, &ON, &params);
        step(&mut env, 3.0, &OFF, &params);
        assert!(step(&mut env, 3.5, &OFF, &params) > 0.0);
        assert_eq!(env.stage(), Stage::Release);

        let gain = step(&mut env, 3.6, &ON, &params);
        assert_eq!(env.stage(), Stage::Attack);
        assert_close(gain, 0.0);
        assert_eq!(env.state().triggers().on_time, 3.6);

        assert_close(step(&mut env, 4.1, &ON, &params), 0.5);
    }

    #[test]
    fn zero_release_cuts_to_silence() {
        let params = EnvelopeParams::adsr(0.1, 0.1, 0.8, 0.0);
        let mut env = Envelope::default();

        step(&mut env, 0.0, &ON, &params);
        assert_close(step(&mut env, 1.0, &ON, &params), 0.8);
        assert_eq!(step(&mut env, 1.1, &OFF, &params), 0.0);
    }

    #[test]
    fn release_from_zero_gain_stays_finite() {
        let params = scenario_params();
        let mut env = Envelope::default();

        // The gate drops one block after the on-edge, while the gain is still
        // zero: the scaled release window has zero width.
        step(&mut env, 1.0, &ON, &params);
        let gain = step(&mut env, 1.001, &OFF, &params);
        assert_eq!(env.stage(), Stage::Release);
        assert_eq!(gain, 0.0);
        assert_eq!(step(&mut env, 1.1, &OFF, &params), 0.0);
    }

    #[test]
    fn missing_gate_holds_previous_output() {
        let params = scenario_params();
        let mut env = Envelope::default();
        step(&mut env, 0.0, &ON, &params);
        step(&mut env, 0.25, &ON, &params);

        let before = *env.state();
        let mut out = [9.0; 8];
        assert!(!env.process(0.75, None, &params, &mut out));
        assert!(out.iter().all(|&s| (s - 0.25).abs() < EPS));

        assert!(!env.process(0.8, Some(&[] as &[f32]), &params, &mut out));
        assert_eq!(env.stage(), before.last_stage());
        assert_eq!(env.level(), before.last_gain());
        assert_eq!(env.state().triggers(), before.triggers());
    }

    #[test]
    fn curve_change_applies_to_the_next_block() {
        let params = scenario_params();
        let mut env = Envelope::default();
        step(&mut env, 0.0, &ON, &params);
        assert_close(step(&mut env, 0.5, &ON, &params), 0.5);

        env.config_mut().curve = CurveMode::Logarithmic;
        assert_close(
            step(&mut env, 0.5, &ON, &params),
            crate::dsp::curve::logarithmic(0.5),
        );
    }

    #[test]
    fn config_change_bends_release_in_flight() {
        let params = scenario_params();
        let mut env = Envelope::default();
        step(&mut env, 0.0, &ON, &params);
        assert_close(step(&mut env, 2.5, &ON, &params), 0.5);
        assert_close(step(&mut env, 3.0, &OFF, &params), 0.5);
        assert_close(step(&mut env, 3.25, &OFF, &params), 0.375);

        // Without hold any gate drop counts as early: the window shrinks to
        // value_to_time(0.5) = 0.5s.
        env.config_mut().sustain_hold = false;
        assert_eq!(env.stage(), Stage::Release);
        assert_close(step(&mut env, 3.3, &OFF, &params), 0.2);

        env.config_mut().curve = CurveMode::Exponential;
        let end = 3.0 + crate::dsp::curve::logarithmic(0.5) as f64;
        let t = ((3.35 - 3.0) / (end - 3.0)) as f32;
        let expected = (1.0 - crate::dsp::curve::exponential(t)) * 0.5;
        assert_close(step(&mut env, 3.35, &OFF, &params), expected);
        assert_eq!(env.stage(), Stage::Release);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let params = scenario_params();
        let mut env = Envelope::default();
        step(&mut env, 0.0, &ON, &params);
        step(&mut env, 0.5, &ON, &params);

        env.reset();
        assert_eq!(env.stage(), Stage::Attack);
        assert_eq!(env.level(), 0.0);
        assert!(!env.state().triggers().has_triggered());
    }
}
