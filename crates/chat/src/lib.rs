//! Response generation pipeline for Websage.
//!
//! This crate sequences the other crates into one operation:
//! optional web search → prompt formatting → completion → parsing of the
//! answer and its trailing citation block → the policy that drops sources
//! when search was not used.
//!
//! # Example
//! ```no_run
//! use websage_chat::Chatbot;
//! use websage_core::AppConfig;
//!
//! # async fn example() -> websage_core::AppResult<()> {
//! let chatbot = Chatbot::from_config(&AppConfig::load()?.chatbot_config())?;
//! let response = chatbot.generate_response("What is Tokio?", true).await?;
//! for (name, url) in &response.sources {
//!     println!("{}: {}", name, url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chatbot;
pub mod parser;
pub mod types;

// Re-export main types
pub use chatbot::{Chatbot, GenerationSettings};
pub use parser::parse_response;
pub use types::{ChatbotResponse, CitationMap};
