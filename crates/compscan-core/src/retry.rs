//! Reusable retry policy with multiplicative back-off.
//!
//! [`RetryPolicy::run`] wraps any fallible async operation whose error type
//! implements [`Retriable`]. Errors classified as non-retriable are returned
//! immediately; retriable ones are retried up to `max_retries` additional
//! times, sleeping `initial_delay * multiplier^(n-1)` before the n-th retry.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classifies whether an error is worth another attempt.
pub trait Retriable {
    fn is_retriable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Sleep before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(1_000),
            multiplier: 1.5,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            multiplier,
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// | Retry | Delay (1 000 ms, ×1.5) |
    /// |-------|------------------------|
    /// | 1     | 1 000 ms               |
    /// | 2     | 1 500 ms               |
    /// | 3     | 2 250 ms               |
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(1.0).powi(exponent);
        self.initial_delay.mul_f64(factor.min(1_000.0))
    }

    /// Runs `operation`, retrying transient failures.
    ///
    /// `label` identifies the operation in retry log lines.
    ///
    /// # Errors
    ///
    /// Returns the first non-retriable error, or the last error once all
    /// retries are exhausted.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Retriable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retriable() || retry >= self.max_retries {
                        return Err(err);
                    }
                    retry += 1;
                    let delay = self.delay_for(retry);
                    tracing::warn!(
                        operation = label,
                        attempt = retry,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient error, retrying after back-off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
