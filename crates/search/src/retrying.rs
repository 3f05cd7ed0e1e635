//! Retry decorator for search providers.

use crate::client::SearchClient;
use std::sync::Arc;
use websage_core::{AppError, AppResult, RetryPolicy};

/// Wraps a `SearchClient`, retrying `AppError::Search` failures with
/// exponential backoff. Every other error is returned immediately.
pub struct RetryingSearchClient {
    inner: Arc<dyn SearchClient>,
    policy: RetryPolicy,
}

impl RetryingSearchClient {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: Arc<dyn SearchClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait::async_trait]
impl SearchClient for RetryingSearchClient {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn search(&self, query: &str) -> AppResult<String> {
        let label = format!("{} search", self.inner.provider_name());
        self.policy
            .run(&label, AppError::is_search_failure, || self.inner.search(query))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct DownClient {
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl SearchClient for DownClient {
        fn provider_name(&self) -> &str {
            "down"
        }

        async fn search(&self, query: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.is_empty() {
                return Err(AppError::InvalidRequest("empty".to_string()));
            }
            Err(AppError::Search("service unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_search_failure_retried_to_budget() {
        let inner = Arc::new(DownClient {
            calls: AtomicU32::new(0),
        });
        let client = RetryingSearchClient::new(
            inner.clone(),
            RetryPolicy::new(5).with_initial_backoff(Duration::ZERO),
        );

        let result = client.search("rust").await;

        assert!(matches!(result, Err(AppError::Search(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_malformed_query_not_retried() {
        let inner = Arc::new(DownClient {
            calls: AtomicU32::new(0),
        });
        let client = RetryingSearchClient::new(
            inner.clone(),
            RetryPolicy::new(5).with_initial_backoff(Duration::ZERO),
        );

        let result = client.search("").await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
