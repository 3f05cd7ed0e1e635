//! Web search integration crate for Websage.
//!
//! This crate provides the web-search capability the chatbot uses to gather
//! context: a provider-agnostic `SearchClient` trait, a Tavily implementation,
//! and a retry decorator.
//!
//! # Example
//! ```no_run
//! use websage_search::{SearchClient, TavilyClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TavilyClient::new("tvly-...")?;
//! let digest = client.search("When was Rust 1.0 released?").await?;
//! println!("{}", digest);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod retrying;

// Re-export main types
pub use client::{render_digest, SearchClient, SearchHit};
pub use factory::create_search_client;
pub use providers::TavilyClient;
pub use retrying::RetryingSearchClient;
