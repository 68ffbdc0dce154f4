#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

use serde::{Deserialize, Serialize};

/// Tri-state readiness of the accelerated engine, as reported to the UI.
///
/// `active` is the only field callers gate on; `loaded` and `supported`
/// exist to explain *why* the engine is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// The engine module was constructed.
    pub loaded: bool,
    /// The self-check passed on this runtime.
    pub supported: bool,
    /// Calls are currently permitted. Always `loaded && supported`.
    pub active: bool,
    /// Human-readable explanation of the current state.
    pub reason: String,
}

impl EngineStatus {
    /// Status of a fully initialized engine.
    #[must_use]
    pub fn ready() -> Self {
        Self {
            loaded: true,
            supported: true,
            active: true,
            reason: "engine ready".to_owned(),
        }
    }

    /// Status of an engine whose self-check failed on this runtime.
    #[must_use]
    pub fn unsupported(reason: &str) -> Self {
        Self {
            loaded: true,
            supported: false,
            active: false,
            reason: reason.to_owned(),
        }
    }
}
