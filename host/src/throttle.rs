//! Pointer-event throttling.
//!
//! Pointer-move events arrive far faster than smoothing and hit-testing
//! need; the UI bounds them to a fixed rate before calling into the engine.
//! This is host policy, not an engine guarantee.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

use std::time::{Duration, Instant};

/// Default minimum interval between forwarded pointer-move events (~60 Hz).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(16);

/// A minimum-interval gate. Callers pass the current instant, keeping the
/// gate deterministic under test.
#[derive(Debug, Clone)]
pub struct RateGate {
    min_interval: Duration,
    last_pass: Option<Instant>,
}

impl RateGate {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_pass: None }
    }

    /// Whether an event at `now` may pass. Passing events advance the gate;
    /// rejected events do not.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_pass {
            if now.duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last_pass = Some(now);
        true
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
