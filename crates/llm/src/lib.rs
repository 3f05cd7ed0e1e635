//! LLM integration crate for Websage.
//!
//! This crate provides the text-completion capability behind a
//! provider-agnostic trait, plus a retry decorator.
//!
//! # Providers
//! - **OpenAI**: chat completions API (default)
//! - **Ollama**: local runtime, no credential
//!
//! # Example
//! ```no_run
//! use websage_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...")?;
//! let request = LlmRequest::new("Hello, world!", "gpt-3.5-turbo").with_temperature(0.2);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod retrying;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use retrying::RetryingLlmClient;
pub use types::ProviderType;
