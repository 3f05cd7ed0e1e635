//! Ask command handler.
//!
//! Answers one question, optionally grounded in a web search.

use crate::render::{render_json, render_response};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use websage_chat::{Chatbot, ChatbotResponse};
use websage_core::{config::AppConfig, AppError, AppResult};

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Ground the answer in a live web search and cite sources
    #[arg(short, long)]
    pub search: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Give up after this many seconds (retries included)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.get_question()?;
        let chatbot = Chatbot::from_config(&config.chatbot_config())?;

        let response = generate_with_timeout(&chatbot, &question, self.search, self.timeout).await?;

        if self.json {
            println!("{}", render_json(&response)?);
        } else {
            println!("{}", render_response(&response));
        }

        Ok(())
    }

    /// Get the question text from the argument or the file.
    fn get_question(&self) -> AppResult<String> {
        let question = match (&self.question, &self.file) {
            (Some(question), _) => question.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(AppError::Config("No question provided".to_string()));
            }
        };

        let question = question.trim().to_string();
        if question.is_empty() {
            return Err(AppError::Config("Question cannot be empty".to_string()));
        }

        Ok(question)
    }
}

/// Run one generation, bounded by `timeout_secs` when given.
pub async fn generate_with_timeout(
    chatbot: &Chatbot,
    question: &str,
    enable_search: bool,
    timeout_secs: Option<u64>,
) -> AppResult<ChatbotResponse> {
    let generation = chatbot.generate_response(question, enable_search);

    match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), generation)
            .await
            .map_err(|_| AppError::Other(format!("Timed out after {}s", secs)))?,
        None => generation.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(question: Option<&str>) -> AskCommand {
        AskCommand {
            question: question.map(str::to_string),
            file: None,
            search: false,
            json: false,
            timeout: None,
        }
    }

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(
            command(Some("  What is Rust?\n")).get_question().unwrap(),
            "What is Rust?"
        );
    }

    #[test]
    fn test_missing_question() {
        assert!(matches!(command(None).get_question(), Err(AppError::Config(_))));
        assert!(command(Some("   ")).get_question().is_err());
    }
}
