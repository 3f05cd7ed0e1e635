//! Completion provider implementations.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use reqwest::StatusCode;
use websage_core::AppError;

pub(crate) use websage_core::config::REQUEST_TIMEOUT_SECS;

/// Whether an HTTP status is worth retrying.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Map a non-success HTTP status to the matching error kind.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AppError {
    let message = format!("{} API error ({}): {}", provider, status, body.trim());

    if is_transient_status(status) {
        AppError::Completion(message)
    } else {
        AppError::InvalidRequest(message)
    }
}

/// Map a transport-level failure (connect, timeout, broken body).
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AppError {
    AppError::Completion(format!("Failed to send request to {}: {}", provider, err))
}
