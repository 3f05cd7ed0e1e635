//! Retry decorator for completion providers.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use std::sync::Arc;
use websage_core::{AppError, AppResult, RetryPolicy};

/// Wraps an `LlmClient`, retrying transient `AppError::Completion` failures
/// with exponential backoff. Every other error is returned immediately.
pub struct RetryingLlmClient {
    inner: Arc<dyn LlmClient>,
    policy: RetryPolicy,
}

impl RetryingLlmClient {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: Arc<dyn LlmClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The retry policy in use.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait::async_trait]
impl LlmClient for RetryingLlmClient {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let label = format!("{} completion", self.inner.provider_name());
        self.policy
            .run(&label, AppError::is_completion_failure, || {
                self.inner.complete(request)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LlmUsage;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails with the given error for the first `failures` calls.
    struct FlakyClient {
        failures: u32,
        error: fn() -> AppError,
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl LlmClient for FlakyClient {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err((self.error)());
            }
            Ok(LlmResponse {
                content: format!("echo: {}", request.prompt),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn flaky(failures: u32, error: fn() -> AppError) -> Arc<FlakyClient> {
        Arc::new(FlakyClient {
            failures,
            error,
            calls: AtomicU32::new(0),
        })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(5).with_initial_backoff(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let inner = flaky(2, || AppError::Completion("timeout".to_string()));
        let client = RetryingLlmClient::new(inner.clone(), policy());

        let response = client
            .complete(&LlmRequest::new("hi", "m"))
            .await
            .unwrap();

        assert_eq!(response.content, "echo: hi");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(client.provider_name(), "flaky");
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let inner = flaky(u32::MAX, || AppError::Completion("503".to_string()));
        let client = RetryingLlmClient::new(inner.clone(), policy());

        let result = client.complete(&LlmRequest::new("hi", "m")).await;

        assert!(matches!(result, Err(AppError::Completion(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_invalid_request_not_retried() {
        let inner = flaky(u32::MAX, || AppError::InvalidRequest("401".to_string()));
        let client = RetryingLlmClient::new(inner.clone(), policy());

        let result = client.complete(&LlmRequest::new("hi", "m")).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
