//! Host error taxonomy.

use platecanvas::error::EngineError;
use thiserror::Error;

/// Errors surfaced by the host adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// An accelerated operation was invoked while the engine is inactive.
    /// The UI must gate calls on the readiness report instead of retrying.
    #[error("engine not active: {reason}")]
    NotReady {
        /// Why the engine is unavailable, verbatim from initialization.
        reason: String,
    },
    /// The engine rejected a call at the memory-protocol layer.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
