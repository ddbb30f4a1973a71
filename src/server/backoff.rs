//! Exponential backoff for accept retries.

use std::time::Duration;

/// Delay before the first retry.
pub const INITIAL_DELAY: Duration = Duration::from_millis(5);
/// Ceiling for the retry delay.
pub const MAX_DELAY: Duration = Duration::from_secs(1);

/// Retry-delay state for the accept loop.
///
/// Starts at 5ms, doubles on each consecutive failure up to 1s, and resets
/// to 5ms after a successful accept. Deterministic (no jitter): the retry
/// cadence is part of the loop's observable contract.
#[derive(Debug, Clone)]
pub struct AcceptBackoff {
    delay: Duration,
}

impl AcceptBackoff {
    pub fn new() -> Self {
        Self {
            delay: INITIAL_DELAY,
        }
    }

    /// The delay to sleep before the next retry. Doubles the stored delay
    /// for the failure after this one, clamped to [`MAX_DELAY`].
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(MAX_DELAY);
        current
    }

    /// Reset to the initial delay after a successful accept.
    pub fn reset(&mut self) {
        self.delay = INITIAL_DELAY;
    }
}

impl Default for AcceptBackoff {
    fn default() -> Self {
        Self::new()
    }
}
