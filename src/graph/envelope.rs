#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    dsp::{
        curve::CurveMode,
        envelope::{Envelope, EnvelopeConfig, EnvelopeParams, Stage},
    },
    graph::{
        gate::GateNode,
        node::{GraphNode, RenderCtx},
    },
    registry::{self, EnvParam},
    MAX_BLOCK_SIZE,
};

/*
Envelope Node
=============

Puts the envelope unit into a graph. The node owns:

  gate      a connected gate source, rendered into a scratch buffer
            every block (or nothing, in which case every block is a
            no-op that holds the last gain)

  params    intrinsic attack/decay/sustain/release values, as set from
            the control side

  inputs    optional per-parameter sources; their first sample each
            block is added to the intrinsic value (k-rate), the same
            way a host sums a connection into an audio parameter

Every block the effective parameters are clamped against the declared
schema before the engine sees them:

  [Gate] ──→ gate ┐
  [Src]  ──→ attack ──┐
                  ├──→ (EnvNode) ──→ gain
  intrinsic ──────┘

  let env = EnvNode::new(GateNode::open(), EnvelopeConfig::default())
      .with_params(EnvelopeParams::adsr(0.01, 0.2, 0.6, 0.5));

For control from another thread, `into_shared()` splits the node into
an audio-side `SharedEnvNode` and a control-side `EnvelopeHandle`.
Messages are drained at the start of each block, so every block sees
whatever values are current at that moment.
*/

pub struct EnvNode<G: GraphNode> {
    env: Envelope,
    params: EnvelopeParams,
    gate: Option<G>,
    gate_buffer: Vec<f32>,
    param_inputs: [Option<Box<dyn GraphNode>>; 4], // indexed by EnvParam
    param_buffer: Vec<f32>,
}

impl EnvNode<GateNode> {
    /// Envelope with no gate connected.
    pub fn unpatched(config: EnvelopeConfig) -> Self {
        Self::build(None, config)
    }
}

impl<G: GraphNode> EnvNode<G> {
    pub fn new(gate: G, config: EnvelopeConfig) -> Self {
        Self::build(Some(gate), config)
    }

    fn build(gate: Option<G>, config: EnvelopeConfig) -> Self {
        tracing::debug!(
            unit = registry::UNIT_ID,
            sustain_hold = config.sustain_hold,
            curve = %config.curve,
            patched = gate.is_some(),
            "creating envelope node"
        );

        Self {
            env: Envelope::new(config),
            params: registry::default_params(),
            gate,
            gate_buffer: vec![0.0; MAX_BLOCK_SIZE],
            param_inputs: [None, None, None, None],
            param_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn with_params(mut self, params: EnvelopeParams) -> Self {
        self.params = registry::clamp_params(&params);
        self
    }

    /// Set an intrinsic parameter value, clamped to its declared bounds.
    pub fn set_param(&mut self, param: EnvParam, value: f32) {
        param.set(&mut self.params, param.descriptor().clamp(value));
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    pub fn set_sustain_hold(&mut self, sustain_hold: bool) {
        self.env.config_mut().sustain_hold = sustain_hold;
    }

    pub fn set_curve(&mut self, curve: CurveMode) {
        self.env.config_mut().curve = curve;
    }

    pub fn config(&self) -> &EnvelopeConfig {
        self.env.config()
    }

    pub fn connect_gate(&mut self, gate: G) {
        self.gate = Some(gate);
    }

    pub fn disconnect_gate(&mut self) -> Option<G> {
        self.gate.take()
    }

    /// Drive `param` from another node, summed with the intrinsic value.
    pub fn connect_param<N: GraphNode + 'static>(&mut self, param: EnvParam, source: N) {
        self.param_inputs[param as usize] = Some(Box::new(source));
    }

    pub fn disconnect_param(&mut self, param: EnvParam) {
        self.param_inputs[param as usize] = None;
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn stage(&self) -> Stage {
        self.env.stage()
    }

    pub fn reset(&mut self) {
        self.env.reset();
    }

    /// Render one block with an externally supplied gate block.
    ///
    /// `None` (or an empty slice) means no gate input: the envelope holds
    /// its last gain and does not advance.
    pub fn process_with_gate(&mut self, gate: Option<&[f32]>, out: &mut [f32], ctx: &RenderCtx) {
        let params = self.block_params(out.len(), ctx);
        self.env.process(ctx.time, gate, &params, out);
    }

    /// Parameters for the block starting at `ctx`: intrinsic values plus
    /// connected inputs, clamped to the schema.
    fn block_params(&mut self, len: usize, ctx: &RenderCtx) -> EnvelopeParams {
        let mut params = self.params;
        let len = len.clamp(1, MAX_BLOCK_SIZE);

        for param in EnvParam::ALL {
            if let Some(input) = self.param_inputs[param as usize].as_mut() {
                let buffer = &mut self.param_buffer[..len];
                input.render_block(buffer, ctx);
                param.set(&mut params, param.get(&self.params) + buffer[0]);
            }
        }

        registry::clamp_params(&params)
    }

    fn render_chunk(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();
        let params = self.block_params(len, ctx);

        match self.gate.as_mut() {
            Some(gate) => {
                let gate_block = &mut self.gate_buffer[..len];
                gate.render_block(gate_block, ctx);
                self.env.process(ctx.time, Some(&*gate_block), &params, out);
            }
            None => {
                self.env.process(ctx.time, None, &params, out);
            }
        }
    }

    #[cfg(feature = "rtrb")]
    pub fn into_shared(self) -> (SharedEnvNode<G>, EnvelopeHandle) {
        let (tx, rx) = RingBuffer::<EnvelopeMessage>::new(ENVELOPE_QUEUE_SIZE);

        let handle = EnvelopeHandle { tx };
        let node = SharedEnvNode { node: self, rx };

        (node, handle)
    }

    #[cfg(feature = "rtrb")]
    fn apply(&mut self, msg: EnvelopeMessage) {
        match msg {
            EnvelopeMessage::SetParam { param, value } => self.set_param(param, value),
            EnvelopeMessage::SetSustainHold(sustain_hold) => self.set_sustain_hold(sustain_hold),
            EnvelopeMessage::SetCurve(curve) => self.set_curve(curve),
            EnvelopeMessage::Reset => self.reset(),
        }
    }
}

impl<G: GraphNode> GraphNode for EnvNode<G> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Blocks longer than the scratch buffers are split into several
        // envelope blocks.
        for (i, chunk) in out.chunks_mut(MAX_BLOCK_SIZE).enumerate() {
            self.render_chunk(chunk, &ctx.offset(i * MAX_BLOCK_SIZE));
        }
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.env.level())
    }

    fn is_active(&self) -> bool {
        self.env.stage() != Stage::Release || self.env.level() > 0.0
    }
}

/// Control messages for a [`SharedEnvNode`].
#[cfg(feature = "rtrb")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeMessage {
    SetParam { param: EnvParam, value: f32 },
    SetSustainHold(bool),
    SetCurve(CurveMode),
    Reset,
}

#[cfg(feature = "rtrb")]
const ENVELOPE_QUEUE_SIZE: usize = 64;

/// Control-thread side of a [`SharedEnvNode`].
#[cfg(feature = "rtrb")]
pub struct EnvelopeHandle {
    tx: Producer<EnvelopeMessage>,
}

#[cfg(feature = "rtrb")]
impl EnvelopeHandle {
    pub fn set_param(&mut self, param: EnvParam, value: f32) {
        self.send(EnvelopeMessage::SetParam { param, value });
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.set_param(EnvParam::Attack, seconds);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.set_param(EnvParam::Decay, seconds);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.set_param(EnvParam::Sustain, level);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.set_param(EnvParam::Release, seconds);
    }

    pub fn set_sustain_hold(&mut self, sustain_hold: bool) {
        self.send(EnvelopeMessage::SetSustainHold(sustain_hold));
    }

    pub fn set_curve(&mut self, curve: CurveMode) {
        self.send(EnvelopeMessage::SetCurve(curve));
    }

    pub fn reset(&mut self) {
        self.send(EnvelopeMessage::Reset);
    }

    fn send(&mut self, msg: EnvelopeMessage) {
        if self.tx.push(msg).is_err() {
            tracing::warn!(?msg, "envelope control queue full, dropping message");
        }
    }
}

/// Envelope node controlled from another thread through an [`EnvelopeHandle`].
#[cfg(feature = "rtrb")]
pub struct SharedEnvNode<G: GraphNode> {
    node: EnvNode<G>,
    rx: Consumer<EnvelopeMessage>,
}

#[cfg(feature = "rtrb")]
impl<G: GraphNode> SharedEnvNode<G> {
    pub fn node(&self) -> &EnvNode<G> {
        &self.node
    }

    pub fn stage(&self) -> Stage {
        self.node.stage()
    }

    pub fn level(&self) -> f32 {
        self.node.level()
    }

    fn drain(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            self.node.apply(msg);
        }
    }

    /// See [`EnvNode::process_with_gate`].
    pub fn process_with_gate(&mut self, gate: Option<&[f32]>, out: &mut [f32], ctx: &RenderCtx) {
        self.drain();
        self.node.process_with_gate(gate, out, ctx);
    }
}

#[cfg(feature = "rtrb")]
impl<G: GraphNode> GraphNode for SharedEnvNode<G> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.drain();
        self.node.render_block(out, ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.node.get_envelope_level()
    }

    fn is_active(&self) -> bool {
        self.node.is_active()
    }
}
