//! Prompt system for Websage.
//!
//! This crate turns a question and optional web search context into the
//! complete instruction text sent to the completion provider:
//! - A fixed answer template with the citation block contract
//! - Handlebars rendering with escaping disabled and literal variable values
//! - Deterministic output for identical inputs

pub mod builder;
pub mod template;
pub mod types;

// Re-export main types
pub use builder::{format_prompt, PromptFormatter};
pub use template::DEFAULT_TEMPLATE;
pub use types::{FormattedPrompt, PromptRequest};
