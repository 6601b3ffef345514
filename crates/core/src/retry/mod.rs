//! Retry with exponential backoff and jitter.
//!
//! The policy is an iterative loop with an explicit attempt counter and a
//! pluggable classifier; it only ever re-runs operations whose failure the
//! classifier marks as transient. Delays are `tokio::time::sleep` calls, so
//! a pending retry suspends its task instead of blocking, and dropping the
//! future cancels the whole sequence.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Upper bound of the random jitter added to every backoff delay, to avoid
/// synchronized retry storms.
pub const JITTER_CAP_MS: u64 = 200;

/// Exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// The store-facing default: 3 attempts, 500ms base, 2s cap.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Returns the backoff delay after attempt `attempt` (0-indexed):
    /// `min(base_delay * 2^attempt, max_delay)`, without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Runs `operation` up to `max_attempts` times.
    ///
    /// After a failed attempt, `retryable(&err)` decides whether another
    /// attempt is worth making; a terminal error or an exhausted budget
    /// propagates immediately without further waiting.
    pub async fn run<T, E, F, Fut, P>(&self, retryable: P, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt + 1 >= attempts || !retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt) + jitter();
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..=JITTER_CAP_MS))
}
