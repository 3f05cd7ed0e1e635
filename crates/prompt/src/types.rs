//! Prompt types for Websage.

use serde::{Deserialize, Serialize};

/// The inputs of one formatting call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// The user's question, inserted verbatim
    pub question: String,

    /// Search context; empty when search is disabled
    #[serde(default)]
    pub context: String,
}

impl PromptRequest {
    /// Create a request with search context.
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
        }
    }

    /// Create a request without search context.
    pub fn without_context(question: impl Into<String>) -> Self {
        Self::new(question, String::new())
    }

    /// Whether non-blank context is present.
    pub fn has_context(&self) -> bool {
        !self.context.trim().is_empty()
    }
}

/// A fully rendered prompt, ready for the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedPrompt {
    /// Rendered prompt text
    pub text: String,

    /// Whether search context was injected
    #[serde(rename = "contextIncluded")]
    pub context_included: bool,
}

impl FormattedPrompt {
    /// Borrow the prompt text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for FormattedPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
