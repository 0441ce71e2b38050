//! Runtime for driving graph nodes outside a host.
//!
//! `Transport` plays the part of the host's block clock: it hands out one
//! render context per quantum and advances by whole frames. `bounce`
//! renders a node offline against it and records one gain per block.
//!
//! # Example
//!
//! ```
//! use patch_adsr::{
//!     dsp::{EnvelopeConfig, EnvelopeParams},
//!     graph::{EnvNode, GateEvent, GateNode},
//!     runtime::{bounce_until, Transport},
//!     RENDER_QUANTUM,
//! };
//!
//! let gate = GateNode::scripted(vec![GateEvent::open(0.0), GateEvent::close(0.5)]);
//! let mut env = EnvNode::new(gate, EnvelopeConfig::default())
//!     .with_params(EnvelopeParams::adsr(0.1, 0.1, 0.5, 0.2));
//!
//! let mut transport = Transport::new(48_000.0, RENDER_QUANTUM)?;
//! let trace = bounce_until(&mut env, &mut transport, 1.0);
//! assert!(trace.iter().all(|frame| (0.0..=1.0).contains(&frame.value)));
//! # Ok::<(), patch_adsr::EnvelopeError>(())
//! ```

mod bounce;
mod transport;

pub use bounce::{bounce, bounce_until, BlockFrame};
pub use transport::Transport;
