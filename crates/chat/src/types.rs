//! Chatbot response types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source display name → URL.
pub type CitationMap = BTreeMap<String, String>;

/// The result of one generation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatbotResponse {
    /// Answer text, without any citation block
    pub answer: String,

    /// Cited sources; always empty when search was disabled
    #[serde(default)]
    pub sources: CitationMap,
}

impl ChatbotResponse {
    /// Create a response.
    pub fn new(answer: impl Into<String>, sources: CitationMap) -> Self {
        Self {
            answer: answer.into(),
            sources,
        }
    }

    /// Whether any sources were cited.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Split into `(answer, sources)`.
    pub fn into_parts(self) -> (String, CitationMap) {
        (self.answer, self.sources)
    }
}
