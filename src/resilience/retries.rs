//! Retry executor.
//!
//! # Responsibilities
//! - Re-run a failing async operation with exponential backoff
//! - Report each retry to an observer before the backoff sleep starts
//! - Hand the final error back untouched
//!
//! # Design Decisions
//! - `max_retries` counts extra attempts: total attempts = `max_retries + 1`
//! - The executor knows nothing about health; callers report the overall outcome

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::{calculate_backoff, calculate_backoff_with_jitter};

/// How often and how patiently to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if self.jitter {
            calculate_backoff_with_jitter(attempt, base, max)
        } else {
            calculate_backoff(attempt, base, max)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
        }
    }
}

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// `on_retry(attempt, delay, &error)` is called before each backoff sleep,
/// with `attempt` counting retries from 1.
pub async fn retry_with_backoff<T, E, Op, Fut, OnRetry>(
    policy: &RetryPolicy,
    mut on_retry: OnRetry,
    mut operation: Op,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    OnRetry: FnMut(u32, Duration, &E),
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                on_retry(attempt, delay, &error);
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

/// [`retry_with_backoff`] without an observer.
pub async fn retry<T, E, Op, Fut>(policy: &RetryPolicy, operation: Op) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with_backoff(policy, |_, _, _| {}, operation).await
}
