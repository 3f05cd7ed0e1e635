//! Web search abstraction.

use serde::{Deserialize, Serialize};
use websage_core::AppResult;

/// One ranked web result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Extracted page content or snippet
    #[serde(default)]
    pub content: String,
}

/// Trait for web search providers.
///
/// `search` returns a natural-language digest of the top results, ready to
/// be injected into a prompt as context. Implementations hold only immutable
/// configuration and are safe to share across concurrent requests.
///
/// Transient failures (network, downtime, rejected credentials) are reported
/// as `AppError::Search`; malformed queries as `AppError::InvalidRequest`.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Get the provider name (e.g., "tavily").
    fn provider_name(&self) -> &str;

    /// Search the web and return a text digest of the top results.
    async fn search(&self, query: &str) -> AppResult<String>;
}

/// Render a provider summary and hits into a prompt-ready digest.
///
/// Each hit becomes a numbered block with its title, URL and content, so the
/// model can cite the URLs it actually saw.
pub fn render_digest(summary: Option<&str>, hits: &[SearchHit]) -> String {
    let mut digest = String::new();

    if let Some(summary) = summary.map(str::trim).filter(|s| !s.is_empty()) {
        digest.push_str("Summary: ");
        digest.push_str(summary);
        digest.push_str("\n\n");
    }

    for (i, hit) in hits.iter().enumerate() {
        digest.push_str(&format!(
            "[{}] {}\nURL: {}\n{}\n\n",
            i + 1,
            hit.title.trim(),
            hit.url.trim(),
            hit.content.trim()
        ));
    }

    digest.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, url: &str, content: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_render_digest_with_summary() {
        let digest = render_digest(
            Some("Rust is a systems language."),
            &[
                hit("Rust", "https://www.rust-lang.org", "A language empowering everyone."),
                hit("Wikipedia", "https://en.wikipedia.org/wiki/Rust", " Rust is... "),
            ],
        );

        assert!(digest.starts_with("Summary: Rust is a systems language.\n\n[1] Rust\n"));
        assert!(digest.contains("URL: https://www.rust-lang.org\n"));
        assert!(digest.ends_with("[2] Wikipedia\nURL: https://en.wikipedia.org/wiki/Rust\nRust is..."));
    }

    #[test]
    fn test_render_digest_empty() {
        assert_eq!(render_digest(Some("  "), &[]), "");
        assert_eq!(render_digest(None, &[]), "");
    }
}
