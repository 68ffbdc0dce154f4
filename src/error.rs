//! Engine error taxonomy.

use thiserror::Error;

/// Errors raised by the engine call surface and the linear-memory protocol.
///
/// Smoothing truncation is deliberately absent: hitting the output cap is a
/// normal return (the partial count), not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The one-time self-check failed. Fatal for the process lifetime; the
    /// host must not retry.
    #[error("engine self-check failed: {0}")]
    InitFailed(String),
    /// A block offset that was never allocated, or was already freed.
    #[error("unknown block offset {0}")]
    UnknownBlock(u32),
    /// A call asked for more slots than the block holds.
    #[error("block at offset {offset} holds {len} slots, call needs {needed}")]
    BlockTooSmall {
        /// Offset of the undersized block.
        offset: u32,
        /// Slots the block actually holds.
        len: usize,
        /// Slots the call required.
        needed: usize,
    },
    /// Zero-length allocations are rejected; a block holds at least one slot.
    #[error("allocation of zero slots")]
    ZeroAllocation,
}
