//! Completion provider identifiers.

use websage_core::config::normalize_provider;

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_provider(s).as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Every supported provider name.
    pub fn supported() -> &'static [&'static str] {
        &["openai", "ollama"]
    }
}
