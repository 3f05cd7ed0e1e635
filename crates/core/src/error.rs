//! Error types for Websage.
//!
//! This module defines a unified error enum that covers every error category
//! in the workspace: configuration, provider failures (search and completion),
//! prompt rendering, I/O and serialization.

use thiserror::Error;

/// Unified error type for Websage.
///
/// All fallible functions return `Result<T, AppError>`.
/// Provider adapters distinguish transient failures (`Search`, `Completion`),
/// which the retry policy may retry, from `InvalidRequest`, which is final.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors, including missing credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transient web search provider errors
    #[error("Search error: {0}")]
    Search(String),

    /// Transient completion provider errors
    #[error("Completion error: {0}")]
    Completion(String),

    /// Requests a provider rejected for reasons a retry will not fix
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// True for transient search provider failures.
    pub fn is_search_failure(&self) -> bool {
        matches!(self, AppError::Search(_))
    }

    /// True for transient completion provider failures.
    pub fn is_completion_failure(&self) -> bool {
        matches!(self, AppError::Completion(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert!(AppError::Search("down".to_string()).is_search_failure());
        assert!(!AppError::Search("down".to_string()).is_completion_failure());
        assert!(AppError::Completion("timeout".to_string()).is_completion_failure());
        assert!(!AppError::InvalidRequest("bad".to_string()).is_search_failure());
        assert!(!AppError::InvalidRequest("bad".to_string()).is_completion_failure());
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
