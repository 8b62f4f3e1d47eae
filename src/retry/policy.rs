//! Retry decision and backoff computation

use crate::error::{Error, RETRIED_HTTP_CODES};
use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;

/// Retry policy shared by every logical HTTP call.
///
/// A call is attempted up to `max_attempts` times. The backoff applied before
/// attempt `k` (k >= 2) is `backoff_factor * 2^(k-2)` plus a uniformly
/// distributed random jitter in `[0, max_jitter]`. The first attempt never
/// waits.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempt budget per logical call
    pub max_attempts: u32,
    /// Base duration of the exponential backoff
    pub backoff_factor: Duration,
    /// Upper bound of the random jitter added to each wait
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and backoff settings
    pub fn new(max_attempts: u32, backoff_factor: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts,
            backoff_factor,
            max_jitter,
        }
    }

    /// Check whether the given status code warrants another attempt
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        RETRIED_HTTP_CODES.contains(&status.as_u16())
    }

    /// Check whether the given error warrants another attempt
    pub fn should_retry(&self, error: &Error) -> bool {
        error.is_retryable()
    }

    /// True while `attempt` leaves budget for at least one more attempt
    pub fn has_budget(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Wait duration applied before the given attempt.
    ///
    /// `attempt` is 1-based; attempt 1 has no wait.
    pub fn wait_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 2);
        let backoff = self.backoff_factor.saturating_mul(factor);
        backoff + self.jitter()
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let jitter = rand::thread_rng().gen_range(0.0..=self.max_jitter.as_secs_f64());
        Duration::from_secs_f64(jitter)
    }
}
