//! Offline rendering - run a node against the transport without a device

use crate::{graph::node::GraphNode, runtime::transport::Transport, MAX_BLOCK_SIZE};

/// One rendered block, reduced to its first sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFrame {
    /// Block start time in seconds
    pub time: f64,
    /// First sample of the block
    pub value: f32,
}

/// Render `blocks` blocks of `node`, advancing `transport` as it goes.
///
/// Envelope output is constant across a block, so the first sample is the
/// whole story for a gain trace.
pub fn bounce<N: GraphNode + ?Sized>(
    node: &mut N,
    transport: &mut Transport,
    blocks: usize,
) -> Vec<BlockFrame> {
    let mut buffer = [0.0f32; MAX_BLOCK_SIZE];
    let block = &mut buffer[..transport.block_size()];

    (0..blocks)
        .map(|_| {
            let ctx = transport.ctx();
            node.render_block(block, &ctx);
            transport.advance(block.len());
            BlockFrame {
                time: ctx.time,
                value: block[0],
            }
        })
        .collect()
}

/// Render until the transport reaches `seconds` (inclusive of the block
/// that starts there).
pub fn bounce_until<N: GraphNode + ?Sized>(
    node: &mut N,
    transport: &mut Transport,
    seconds: f64,
) -> Vec<BlockFrame> {
    let remaining = (seconds - transport.time()).max(0.0);
    let blocks = (remaining / transport.block_duration()).floor() as usize + 1;
    bounce(node, transport, blocks)
}
