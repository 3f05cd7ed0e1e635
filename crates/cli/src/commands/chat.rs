//! Interactive chat loop.

use crate::commands::ask::generate_with_timeout;
use crate::render::render_response;
use clap::Args;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use websage_chat::Chatbot;
use websage_core::{config::AppConfig, AppResult};

const FAILURE_NOTICE: &str = "Sorry, something went wrong while answering. Please try again.";

/// Start an interactive session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Start with web search enabled
    #[arg(short, long)]
    pub search: bool,

    /// Per-question timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Question(String),
    SetSearch(bool),
    History,
    Quit,
    Empty,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        if !line.starts_with('/') {
            return Input::Question(line.to_string());
        }

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("/quit" | "/exit"), None, _) => Input::Quit,
            (Some("/history"), None, _) => Input::History,
            (Some("/search"), Some("on"), None) => Input::SetSearch(true),
            (Some("/search"), Some("off"), None) => Input::SetSearch(false),
            _ => Input::Unknown(line.to_string()),
        }
    }
}

/// In-memory transcript of one session. Never persisted.
#[derive(Debug, Default)]
struct Transcript {
    turns: Vec<(String, String)>,
}

impl Transcript {
    fn record(&mut self, question: &str, rendered: &str) {
        self.turns.push((question.to_string(), rendered.to_string()));
    }

    fn render(&self) -> String {
        if self.turns.is_empty() {
            return "(no messages yet)".to_string();
        }
        self.turns
            .iter()
            .map(|(question, answer)| format!("You: {}\nWebsage: {}", question, answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl ChatCommand {
    /// Execute the chat loop until `/quit` or end of input.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let chatbot = Chatbot::from_config(&config.chatbot_config())?;
        let mut search = self.search;
        let mut transcript = Transcript::default();

        eprintln!(
            "Websage chat. Search is {}. Commands: /search on|off, /history, /quit",
            on_off(search)
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("> ");
            std::io::stderr().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match Input::parse(&line) {
                Input::Empty => continue,
                Input::Quit => break,
                Input::History => println!("{}", transcript.render()),
                Input::SetSearch(enabled) => {
                    search = enabled;
                    eprintln!("Search is {}.", on_off(search));
                }
                Input::Unknown(command) => {
                    eprintln!("Unknown command: {}", command);
                }
                Input::Question(question) => {
                    match generate_with_timeout(&chatbot, &question, search, self.timeout).await {
                        Ok(response) => {
                            let rendered = render_response(&response);
                            println!("{}\n", rendered);
                            transcript.record(&question, &rendered);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Generation failed");
                            eprintln!("{}", FAILURE_NOTICE);
                        }
                    }
                }
            }
        }

        tracing::info!(turns = transcript.turns.len(), "Chat session ended");
        Ok(())
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
