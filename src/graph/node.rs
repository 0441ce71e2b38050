/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Start time of the block in seconds, on the host's clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Time of the sample `frame` frames into the block.
    #[inline]
    pub fn frame_time(&self, frame: usize) -> f64 {
        self.time + frame as f64 / self.sample_rate as f64
    }

    /// Context for a sub-block starting `frames` frames later.
    pub fn offset(&self, frames: usize) -> Self {
        Self {
            sample_rate: self.sample_rate,
            time: self.frame_time(frames),
        }
    }
}

/// Core trait for audio processing graph nodes
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing output
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn get_envelope_level(&self) -> Option<f32> {
        (**self).get_envelope_level()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// A node that outputs a fixed value, like a host constant source.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNode {
    pub value: f32,
}

impl ConstantNode {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl GraphNode for ConstantNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        out.fill(self.value);
    }
}
