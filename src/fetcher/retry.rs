use crate::config::ImgwConfig;
use std::time::Duration;

/// Bounded exponential backoff without jitter.
///
/// `max_attempts` counts every attempt, the first one included. The delay before
/// attempt `n` (`n >= 2`) is `base_delay * multiplier^(n - 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &ImgwConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            base_delay: config.backoff_base_delay,
            multiplier: config.backoff_multiplier,
        }
    }

    /// Delay to wait before the given 1-based attempt. The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.saturating_pow(attempt - 2);
        self.base_delay.saturating_mul(factor)
    }

    /// All delays a request that never succeeds goes through.
    pub fn schedule(&self) -> Vec<Duration> {
        (2..=self.max_attempts)
            .map(|attempt| self.delay_before(attempt))
            .collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ImgwConfig::default())
    }
}
