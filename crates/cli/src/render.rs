//! Terminal rendering of chatbot responses.

use websage_chat::{ChatbotResponse, CitationMap};
use websage_core::AppResult;

/// Render the sources list, one markdown link per line.
pub fn render_sources(sources: &CitationMap) -> String {
    let mut out = String::from("Sources:");
    for (name, url) in sources {
        out.push_str(&format!("\n- [{}]({})", name, url));
    }
    out
}

/// Render an answer followed by its sources, if any.
pub fn render_response(response: &ChatbotResponse) -> String {
    if response.has_sources() {
        format!("{}\n\n{}", response.answer, render_sources(&response.sources))
    } else {
        response.answer.clone()
    }
}

/// Render a response as pretty JSON: `{"answer": ..., "sources": {...}}`.
pub fn render_json(response: &ChatbotResponse) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(response)?)
}
