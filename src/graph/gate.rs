#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::graph::node::{GraphNode, RenderCtx};

/*
Gate Source
===========

Produces the control-rate gate signal an envelope listens to: 1.0 while
the gate is open, 0.0 while it is closed.

  // Fixed gate
  let held = GateNode::open();

  // Scripted: open at 0s, close at 0.5s
  let gate = GateNode::scripted(vec![
      GateEvent::open(0.0),
      GateEvent::close(0.5),
  ]);

  // Live: toggled from another thread
  let (gate, mut handle) = GateNode::closed().into_shared();
  handle.open();

Scripted events take effect at sample accuracy, so an event that lands
mid-block produces a mixed block. The envelope reads mixed blocks as
"off". A rising edge therefore shows up on the next full block, while a
falling edge is seen in the mixed block itself and stamped at its start,
slightly before the event.
*/

/// A scheduled gate change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateEvent {
    pub time: f64,
    pub open: bool,
}

impl GateEvent {
    pub fn open(time: f64) -> Self {
        Self { time, open: true }
    }

    pub fn close(time: f64) -> Self {
        Self { time, open: false }
    }
}

pub struct GateNode {
    open: bool,
    script: Vec<GateEvent>, // sorted by time
    cursor: usize,          // next event to apply
}

impl GateNode {
    pub fn open() -> Self {
        Self::with_state(true)
    }

    pub fn closed() -> Self {
        Self::with_state(false)
    }

    fn with_state(open: bool) -> Self {
        Self {
            open,
            script: Vec::new(),
            cursor: 0,
        }
    }

    /// Closed gate that follows a list of timed events.
    pub fn scripted(mut events: Vec<GateEvent>) -> Self {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            open: false,
            script: events,
            cursor: 0,
        }
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    #[cfg(feature = "rtrb")]
    pub fn into_shared(self) -> (SharedGateNode, GateHandle) {
        let (tx, rx) = RingBuffer::<bool>::new(GATE_QUEUE_SIZE);
        (SharedGateNode { gate: self, rx }, GateHandle { tx })
    }
}

impl GraphNode for GateNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if self.cursor >= self.script.len() {
            out.fill(if self.open { 1.0 } else { 0.0 });
            return;
        }

        for (i, sample) in out.iter_mut().enumerate() {
            let now = ctx.frame_time(i);
            while let Some(event) = self.script.get(self.cursor) {
                if event.time > now {
                    break;
                }
                self.open = event.open;
                self.cursor += 1;
            }
            *sample = if self.open { 1.0 } else { 0.0 };
        }
    }
}

#[cfg(feature = "rtrb")]
const GATE_QUEUE_SIZE: usize = 64;

/// Control-thread side of a [`SharedGateNode`].
#[cfg(feature = "rtrb")]
pub struct GateHandle {
    tx: Producer<bool>,
}

#[cfg(feature = "rtrb")]
impl GateHandle {
    pub fn open(&mut self) {
        self.set(true);
    }

    pub fn close(&mut self) {
        self.set(false);
    }

    pub fn set(&mut self, open: bool) {
        if self.tx.push(open).is_err() {
            tracing::warn!(open, "gate queue full, dropping gate change");
        }
    }
}

/// Gate source whose state is driven from another thread.
#[cfg(feature = "rtrb")]
pub struct SharedGateNode {
    gate: GateNode,
    rx: Consumer<bool>,
}

#[cfg(feature = "rtrb")]
impl SharedGateNode {
    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }
}

#[cfg(feature = "rtrb")]
impl GraphNode for SharedGateNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        while let Ok(open) = self.rx.pop() {
            self.gate.set_open(open);
        }
        self.gate.render_block(out, ctx);
    }
}
