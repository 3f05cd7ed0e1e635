//! Tavily web search provider.
//!
//! Tavily is a search API aimed at LLM applications; with `include_answer`
//! it returns a short generated summary alongside ranked results.
//! API: https://docs.tavily.com/documentation/api-reference/endpoint/search

use crate::client::{render_digest, SearchClient, SearchHit};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use websage_core::{config::REQUEST_TIMEOUT_SECS, AppError, AppResult};

/// Default Tavily API base URL.
pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

/// Default number of results folded into the digest.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: u32,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily search client.
pub struct TavilyClient {
    base_url: String,
    api_key: String,
    max_results: u32,
    client: reqwest::Client,
}

impl TavilyClient {
    /// Create a client against the public Tavily API.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_TAVILY_URL, api_key)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client for Tavily: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_results: DEFAULT_MAX_RESULTS,
            client,
        })
    }

    /// Set how many results are requested.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    fn to_request<'a>(&self, query: &'a str) -> TavilyRequest<'a> {
        TavilyRequest {
            query,
            search_depth: "basic",
            max_results: self.max_results,
            include_answer: true,
            include_raw_content: false,
        }
    }

    /// Turn a decoded response into the prompt digest, skipping URL-less hits.
    fn convert_response(response: TavilyResponse) -> String {
        let hits: Vec<SearchHit> = response
            .results
            .into_iter()
            .filter(|r| !r.url.trim().is_empty())
            .map(|r| SearchHit {
                title: if r.title.trim().is_empty() {
                    "Untitled".to_string()
                } else {
                    r.title
                },
                url: r.url,
                content: r.content,
            })
            .collect();

        render_digest(response.answer.as_deref(), &hits)
    }
}

/// Map a non-success status: malformed queries are final, everything else
/// (downtime, throttling, rejected credentials) is worth retrying.
fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = format!("Tavily API error ({}): {}", status, body.trim());

    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::NOT_FOUND
        | StatusCode::METHOD_NOT_ALLOWED
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNPROCESSABLE_ENTITY => AppError::InvalidRequest(message),
        _ => AppError::Search(message),
    }
}

#[async_trait::async_trait]
impl SearchClient for TavilyClient {
    fn provider_name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> AppResult<String> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Search query cannot be empty".to_string(),
            ));
        }

        tracing::info!("Sending search request to Tavily");
        tracing::debug!("Query: {}", query);

        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_request(query))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to send request to Tavily: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read Tavily response: {}", e)))?;
        let tavily_response: TavilyResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::InvalidRequest(format!("Failed to parse Tavily response: {}", e))
        })?;

        let result_count = tavily_response.results.len();
        let digest = Self::convert_response(tavily_response);

        tracing::info!("Received {} search results from Tavily", result_count);
        tracing::debug!("Search digest: {} bytes", digest.len());

        Ok(digest)
    }
}
