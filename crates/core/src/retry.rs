//! Exponential backoff retry policy shared by the provider adapters.
//!
//! A `RetryPolicy` wraps any async operation returning `AppResult<T>`. The
//! caller decides which errors are retriable through a predicate, so the
//! search adapter retries only `AppError::Search` and the completion adapter
//! only `AppError::Completion`. Every other error is returned on first sight.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Default number of attempts (first call included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default wait before the second attempt, in milliseconds.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;

/// Default upper bound for a single wait, in milliseconds.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 8_000;

/// Exponential backoff retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    #[serde(rename = "maxAttempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the second attempt; doubled after every failure
    #[serde(rename = "initialBackoffMs", default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Cap applied to each individual wait
    #[serde(rename = "maxBackoffMs", default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_initial_backoff_ms() -> u64 {
    DEFAULT_INITIAL_BACKOFF_MS
}

fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and default backoff curve.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Set the initial backoff.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff_ms = backoff.as_millis() as u64;
        self
    }

    /// Set the per-wait backoff cap.
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff_ms = backoff.as_millis() as u64;
        self
    }

    /// Wait inserted after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Run `operation` until it succeeds, fails with an error `retry_on`
    /// rejects, or the attempt budget is spent.
    ///
    /// The last retriable error is returned once attempts are exhausted.
    ///
    /// # Example
    /// ```no_run
    /// use websage_core::{AppError, RetryPolicy};
    ///
    /// # async fn example() -> Result<(), AppError> {
    /// let policy = RetryPolicy::default();
    /// let value = policy
    ///     .run("search", AppError::is_search_failure, || async {
    ///         Ok::<_, AppError>("digest".to_string())
    ///     })
    ///     .await?;
    /// assert_eq!(value, "digest");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<T, F, Fut, P>(&self, label: &str, retry_on: P, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
        P: Fn(&AppError) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if retry_on(&e) && attempt < max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}), retrying in {}ms: {}",
                        label,
                        attempt,
                        max_attempts,
                        backoff.as_millis(),
                        e
                    );
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(e) => {
                    if retry_on(&e) {
                        tracing::error!("{} failed after {} attempts: {}", label, attempt, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts).with_initial_backoff(Duration::ZERO)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff_ms, 500);
    }

    #[test]
    fn test_backoff_curve_is_exponential_and_capped() {
        let policy = RetryPolicy::new(5)
            .with_initial_backoff(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(500));

        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_permanent_failure_uses_exact_attempt_budget() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = instant_policy(5)
            .run("search", AppError::is_search_failure, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::Search("service down".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(AppError::Search(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_non_retriable_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = instant_policy(5)
            .run("search", AppError::is_search_failure, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::InvalidRequest("empty query".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_kind_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = instant_policy(5)
            .run("completion", AppError::is_completion_failure, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::Search("wrong kind".to_string())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = instant_policy(5)
            .run("completion", AppError::is_completion_failure, || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(AppError::Completion("rate limited".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }
}
