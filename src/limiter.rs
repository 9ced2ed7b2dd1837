use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::AlgorandError;

/// Token bucket configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateLimiterConfig {
    /// Maximum number of tokens the bucket holds.
    pub capacity: u32,
    /// Time window after which tokens are refilled.
    pub refill_period: Duration,
    /// Tokens added per elapsed period (defaults to `capacity`).
    pub refill_amount: u32,
}

impl RateLimiterConfig {
    /// `capacity` requests per `refill_period`, refilling to full.
    pub fn new(capacity: u32, refill_period: Duration) -> Self {
        Self {
            capacity,
            refill_period,
            refill_amount: capacity,
        }
    }

    pub fn with_refill_amount(mut self, amount: u32) -> Self {
        self.refill_amount = amount;
        self
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
    closed: bool,
    config: RateLimiterConfig,
}

impl BucketState {
    fn new(config: RateLimiterConfig) -> Self {
        Self {
            tokens: config.capacity,
            last_refill: Instant::now(),
            closed: false,
            config,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);

        if elapsed >= self.config.refill_period {
            let periods = elapsed.as_secs_f64() / self.config.refill_period.as_secs_f64();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let tokens_to_add = (periods * self.config.refill_amount as f64) as u32;

            self.tokens = self.tokens.saturating_add(tokens_to_add).min(self.config.capacity);
            self.last_refill = now;
        }
    }

    fn try_consume(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn wait_time(&self) -> Duration {
        if self.tokens >= 1 {
            return Duration::ZERO;
        }
        if self.config.refill_amount == 0 {
            return self.config.refill_period;
        }

        let refill_rate =
            self.config.refill_amount as f64 / self.config.refill_period.as_secs_f64();
        Duration::from_secs_f64(1.0 / refill_rate)
    }
}

/// Shared token bucket gating outbound request attempts.
///
/// The handle is `Clone`; every clone drains the same bucket, so one limiter
/// can be shared across clients and concurrent requests. A consumed token is
/// spent even if the request holding it is cancelled afterwards.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BucketState::new(config))),
        }
    }

    /// Consumes one token, sleeping until one is available.
    ///
    /// Fails with [`AlgorandError::LimiterClosed`] once [`RateLimiter::close`]
    /// has been called, tokens in the bucket or not. The internal lock is
    /// never held across the sleep.
    pub async fn acquire(&self) -> Result<(), AlgorandError> {
        loop {
            let wait_duration = {
                let mut state = self.state.lock().await;
                if state.closed {
                    return Err(AlgorandError::LimiterClosed);
                }
                if state.try_consume() {
                    return Ok(());
                }
                state.wait_time()
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                "rate limited, waiting {} ms for a token",
                wait_duration.as_millis()
            );

            if wait_duration > Duration::ZERO {
                sleep(wait_duration).await;
            } else {
                // Back off briefly instead of spinning on the lock.
                sleep(Duration::from_millis(10)).await;
            }
        }
    }

    /// Consumes one token without waiting; `Ok(false)` when the bucket is
    /// empty right now.
    pub async fn try_acquire(&self) -> Result<bool, AlgorandError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(AlgorandError::LimiterClosed);
        }
        Ok(state.try_consume())
    }

    /// Tokens currently available, after applying any pending refill.
    pub async fn available_tokens(&self) -> u32 {
        let mut state = self.state.lock().await;
        state.refill();
        state.tokens
    }

    /// Restores the bucket to full capacity.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.tokens = state.config.capacity;
        state.last_refill = Instant::now();
    }

    /// Permanently closes the limiter; every later acquire fails.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}
