//! Exponential backoff with jitter for contended store writes.

use std::time::Duration;
use rand::Rng;

use crate::config::StoreConfig;

/// Delay schedule between conflicting conditional writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_ms: u64,
    pub max_ms: u64,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    ///
    /// Grows as `base * 2^(attempt-1)`, capped at `max`, plus up to 50% jitter
    /// so that writers that collided once are unlikely to collide again.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponential = 2u64.saturating_pow(attempt - 1);
        let capped = self.base_ms.saturating_mul(exponential).min(self.max_ms);

        let jitter_range = capped / 2;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped + jitter)
    }
}

impl From<&StoreConfig> for BackoffPolicy {
    fn from(config: &StoreConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }
}
