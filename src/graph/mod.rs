//! Graph nodes for patching the envelope unit.
//!
//! Graph nodes wrap the low-level DSP primitives with what a patching host
//! needs: a connected gate source, per-parameter inputs, block-based
//! rendering and control from another thread.

/// Envelope generator node and its control handle.
pub mod envelope;
/// Gate sources (fixed, scripted, live).
pub mod gate;
/// Core traits shared by all graph nodes.
pub mod node;

pub use envelope::EnvNode;
#[cfg(feature = "rtrb")]
pub use envelope::{EnvelopeHandle, EnvelopeMessage, SharedEnvNode};
pub use gate::{GateEvent, GateNode};
#[cfg(feature = "rtrb")]
pub use gate::{GateHandle, SharedGateNode};
pub use node::{ConstantNode, GraphNode, RenderCtx};
