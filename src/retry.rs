use std::time::Duration;

/// Retry budget and backoff curve for request execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt; `None` means unbounded,
    /// retrying until the request succeeds or fails non-retryably.
    pub max_retries: Option<u32>,
    /// Base backoff in milliseconds (exponential strategy).
    pub base_delay_ms: u64,
    /// Upper bound in milliseconds for a single backoff delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: None,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: Some(0),
            ..Self::default()
        }
    }

    /// At most `retries` retries after the initial attempt.
    pub fn capped(retries: u32) -> Self {
        Self {
            max_retries: Some(retries),
            ..Self::default()
        }
    }

    /// Backoff before the retry following failed attempt `attempt`
    /// (zero-based). `None` is the do-not-retry signal: the budget is spent.
    ///
    /// The curve is deterministic and non-decreasing: the base delay doubles
    /// per attempt with the shift exponent capped at 16, saturating, then
    /// clamped to `max_delay_ms`.
    pub fn backoff_delay(&self, attempt: u32) -> Option<Duration> {
        if let Some(cap) = self.max_retries {
            if attempt >= cap {
                return None;
            }
        }

        let exp = attempt.min(16);
        let multiplier = 1u64 << exp;
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms);
        Some(Duration::from_millis(delay_ms))
    }
}
