//! Websage Core Library
//!
//! This crate provides the foundational utilities shared by every Websage crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management and credential validation
//! - The exponential backoff `RetryPolicy` used by provider adapters

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;

// Re-export commonly used types
pub use config::{AppConfig, ChatbotConfig, CompletionConfig, SearchConfig};
pub use error::{AppError, AppResult};
pub use retry::RetryPolicy;
