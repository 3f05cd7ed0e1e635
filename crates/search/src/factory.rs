//! Search provider factory.

use crate::client::SearchClient;
use crate::providers::TavilyClient;
use std::sync::Arc;
use websage_core::{config::normalize_provider, AppError, AppResult};

/// Create a search client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("tavily")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key
/// * `max_results` - Number of results folded into the digest
pub fn create_search_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    max_results: u32,
) -> AppResult<Arc<dyn SearchClient>> {
    match normalize_provider(provider).as_str() {
        "tavily" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Tavily provider requires API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => TavilyClient::with_base_url(url, api_key)?,
                None => TavilyClient::new(api_key)?,
            };
            Ok(Arc::new(client.with_max_results(max_results)))
        }
        _ => Err(AppError::Config(format!(
            "Unknown search provider: {}. Supported: tavily",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tavily_client() {
        let client = create_search_client("Tavily", None, Some("tvly-test"), 5).unwrap();
        assert_eq!(client.provider_name(), "tavily");
    }

    #[test]
    fn test_tavily_requires_api_key() {
        match create_search_client("tavily", None, None, 5) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires API key")),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for Tavily without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_search_client("bing", None, Some("k"), 5) {
            Err(err) => assert!(err.to_string().contains("Unknown search provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
