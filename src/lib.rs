pub mod dsp;
pub mod error;
pub mod graph; // Envelope unit as a graph node
pub mod registry; // Unit identifier and parameter schema
pub mod runtime; // Block clock and offline rendering

pub use error::{EnvelopeError, EnvelopeResult};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Frames per processing block on the host's audio graph.
pub const RENDER_QUANTUM: usize = 128;
