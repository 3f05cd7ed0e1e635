//! Prompt formatter: renders the answer template with a question and context.

use crate::template::{DEFAULT_TEMPLATE, NO_CONTEXT_MARKER, TEMPLATE_NAME};
use crate::types::{FormattedPrompt, PromptRequest};
use handlebars::Handlebars;
use std::collections::HashMap;
use websage_core::{AppError, AppResult};

/// Renders `PromptRequest`s into `FormattedPrompt`s.
///
/// The template is compiled once at construction. Variable values are
/// inserted as plain text and never compiled, so a question containing
/// `{{...}}` is reproduced literally instead of being interpreted.
#[derive(Debug, Clone)]
pub struct PromptFormatter {
    registry: Handlebars<'static>,
}

impl PromptFormatter {
    /// Create a formatter for the built-in answer template.
    pub fn new() -> AppResult<Self> {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    /// Create a formatter for a custom template using the same variables.
    pub fn with_template(template: &str) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text output, no HTML escaping
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Render a prompt.
    ///
    /// Identical requests always produce byte-identical output.
    ///
    /// # Example
    /// ```
    /// use websage_prompt::{PromptFormatter, PromptRequest};
    ///
    /// let formatter = PromptFormatter::new().unwrap();
    /// let prompt = formatter.format(&PromptRequest::without_context("What is Rust?")).unwrap();
    /// assert!(prompt.text.contains("User question: What is Rust?"));
    /// ```
    pub fn format(&self, request: &PromptRequest) -> AppResult<FormattedPrompt> {
        let context_included = request.has_context();

        let mut variables = HashMap::new();
        variables.insert("question", request.question.as_str());
        variables.insert(
            "context",
            if context_included {
                request.context.as_str()
            } else {
                NO_CONTEXT_MARKER
            },
        );

        let text = self
            .registry
            .render(TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        tracing::debug!(
            "Formatted prompt ({} bytes, context included: {})",
            text.len(),
            context_included
        );

        Ok(FormattedPrompt {
            text,
            context_included,
        })
    }
}

/// Render a prompt with the built-in template.
pub fn format_prompt(request: &PromptRequest) -> AppResult<FormattedPrompt> {
    PromptFormatter::new()?.format(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_template() {
        let formatter = PromptFormatter::with_template("Q: {{question}} C: {{context}}").unwrap();
        let prompt = formatter
            .format(&PromptRequest::new("Hello, world!", "ctx"))
            .unwrap();
        assert_eq!(prompt.text, "Q: Hello, world! C: ctx");
        assert!(prompt.context_included);
    }

    #[test]
    fn test_custom_template_gets_no_context_marker() {
        let formatter = PromptFormatter::with_template("C: {{context}}").unwrap();
        let prompt = formatter.format(&PromptRequest::new("q", " ")).unwrap();
        assert_eq!(prompt.text, format!("C: {}", NO_CONTEXT_MARKER));
        assert!(!prompt.context_included);
    }

    #[test]
    fn test_format_without_context() {
        let prompt = format_prompt(&PromptRequest::without_context("Who wrote Dune?")).unwrap();

        assert!(prompt.text.contains("User question: Who wrote Dune?"));
        assert!(prompt.text.ends_with(&format!("Context:\n{}", NO_CONTEXT_MARKER)));
        assert!(!prompt.context_included);
    }

    #[test]
    fn test_format_with_context() {
        let context = "Dune was written by Frank Herbert (https://en.wikipedia.org/wiki/Dune).";
        let prompt = format_prompt(&PromptRequest::new("Who wrote Dune?", context)).unwrap();

        assert!(prompt.text.ends_with(&format!("Context:\n{}", context)));
        assert!(!prompt.text.ends_with(NO_CONTEXT_MARKER));
        assert!(prompt.context_included);
    }

    #[test]
    fn test_whitespace_context_counts_as_empty() {
        let blank = format_prompt(&PromptRequest::new("q", "  \n ")).unwrap();
        let empty = format_prompt(&PromptRequest::without_context("q")).unwrap();
        assert_eq!(blank, empty);
    }

    #[test]
    fn test_format_is_deterministic() {
        let formatter = PromptFormatter::new().unwrap();
        let request = PromptRequest::new("What is the capital of France?", "Paris is the capital.");

        let first = formatter.format(&request).unwrap();
        let second = formatter.format(&request).unwrap();
        let fresh = format_prompt(&request).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_question_cannot_inject_template_directives() {
        let question = "{{context}} {{#if question}}yes{{/if}} \\{{x}} <b>&</b>";
        let prompt = format_prompt(&PromptRequest::new(question, "SECRET CONTEXT")).unwrap();

        assert!(prompt.text.contains(&format!("User question: {}", question)));
        assert_eq!(prompt.text.matches("SECRET CONTEXT").count(), 1);
    }

    #[test]
    fn test_template_citation_contract_present() {
        let prompt = format_prompt(&PromptRequest::without_context("q")).unwrap();
        assert!(prompt.text.contains("single JSON object"));
        assert!(prompt.text.contains("DO NOT include any sources"));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let result = PromptFormatter::with_template("{{#if question}}x{{/each}}");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
