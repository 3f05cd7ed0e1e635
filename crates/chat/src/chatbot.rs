//! The chatbot: search, format, complete, parse.
//!
//! `Chatbot::generate_response` is the single operation callers use. Each call
//! is independent; the chatbot holds only immutable provider configuration,
//! so one instance can serve concurrent requests.

use crate::parser::parse_response;
use crate::types::{ChatbotResponse, CitationMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use websage_core::{AppResult, ChatbotConfig, CompletionConfig};
use websage_llm::{create_client, LlmClient, LlmRequest, RetryingLlmClient};
use websage_prompt::{PromptFormatter, PromptRequest};
use websage_search::{create_search_client, RetryingSearchClient, SearchClient};

/// Sampling settings fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional completion length cap
    pub max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.2,
            max_tokens: None,
        }
    }
}

impl From<&CompletionConfig> for GenerationSettings {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Question-answering chatbot with optional web search.
pub struct Chatbot {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchClient>,
    formatter: PromptFormatter,
    settings: GenerationSettings,
}

impl Chatbot {
    /// Create a chatbot from injected providers.
    ///
    /// The providers are used as given; wrap them in `RetryingLlmClient` and
    /// `RetryingSearchClient` to get retries.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchClient>,
        settings: GenerationSettings,
    ) -> AppResult<Self> {
        Ok(Self {
            llm,
            search,
            formatter: PromptFormatter::new()?,
            settings,
        })
    }

    /// Create a chatbot from configuration.
    ///
    /// Validates credentials first and fails with `AppError::Config` naming
    /// every missing one. Both providers are wrapped with the configured
    /// retry policy.
    ///
    /// # Example
    /// ```no_run
    /// use websage_chat::Chatbot;
    /// use websage_core::AppConfig;
    ///
    /// # async fn example() -> websage_core::AppResult<()> {
    /// let config = AppConfig::load()?.chatbot_config();
    /// let chatbot = Chatbot::from_config(&config)?;
    /// let response = chatbot.generate_response("Who wrote Dune?", true).await?;
    /// println!("{}", response.answer);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &ChatbotConfig) -> AppResult<Self> {
        config.validate()?;

        let llm = create_client(
            &config.completion.provider,
            config.completion.endpoint.as_deref(),
            config.completion.api_key.as_deref(),
        )?;
        let search = create_search_client(
            &config.search.provider,
            config.search.endpoint.as_deref(),
            config.search.api_key.as_deref(),
            config.search.max_results,
        )?;

        info!(
            "Chatbot ready (completion: {}/{}, search: {}, max attempts: {})",
            llm.provider_name(),
            config.completion.model,
            search.provider_name(),
            config.retry.max_attempts
        );

        Self::new(
            Arc::new(RetryingLlmClient::new(llm, config.retry)),
            Arc::new(RetryingSearchClient::new(search, config.retry)),
            GenerationSettings::from(&config.completion),
        )
    }

    /// Generation settings in use.
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Answer `question`, optionally grounding it in a web search.
    ///
    /// Steps: search (only when `enable_search`), format the prompt, complete,
    /// parse the answer and citation block. Sources are returned only when
    /// search was enabled and produced context; a citation block the model
    /// emits without context is discarded.
    ///
    /// # Errors
    /// * `AppError::Search` once search retries are exhausted (the completion
    ///   provider is not called)
    /// * `AppError::Completion` once completion retries are exhausted
    /// * `AppError::InvalidRequest` for requests a provider rejects outright
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn generate_response(
        &self,
        question: &str,
        enable_search: bool,
    ) -> AppResult<ChatbotResponse> {
        let context = if enable_search {
            info!("Searching the web for context");
            self.search.search(question).await?
        } else {
            String::new()
        };

        let prompt = self
            .formatter
            .format(&PromptRequest::new(question, context))?;

        let mut request = LlmRequest::new(prompt.text, &self.settings.model)
            .with_temperature(self.settings.temperature);
        if let Some(max_tokens) = self.settings.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.llm.complete(&request).await?;
        debug!(
            "Completion usage - Prompt: {}, Completion: {}, Total: {}",
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        );

        let (answer, sources) = parse_response(response.trimmed_content());

        let sources = if enable_search && prompt.context_included {
            sources
        } else {
            if !sources.is_empty() {
                debug!(
                    "Discarding {} citation(s) emitted without search context",
                    sources.len()
                );
            }
            CitationMap::new()
        };

        info!("Generated answer with {} source(s)", sources.len());

        Ok(ChatbotResponse { answer, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use websage_core::{AppConfig, AppError, RetryPolicy};
    use websage_llm::{LlmResponse, LlmUsage};
    use websage_prompt::template::NO_CONTEXT_MARKER;

    /// Completion provider that replays a fixed reply and records prompts.
    struct ScriptedLlm {
        reply: String,
        calls: AtomicU32,
        prompts: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedLlm {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicU32::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> LlmRequest {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.clone());
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 5),
            })
        }
    }

    /// Search provider that returns a fixed digest or always fails.
    struct ScriptedSearch {
        digest: Option<String>,
        calls: AtomicU32,
    }

    impl ScriptedSearch {
        fn ok(digest: &str) -> Arc<Self> {
            Arc::new(Self {
                digest: Some(digest.to_string()),
                calls: AtomicU32::new(0),
            })
        }

        fn down() -> Arc<Self> {
            Arc::new(Self {
                digest: None,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SearchClient for ScriptedSearch {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn search(&self, _query: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.digest
                .clone()
                .ok_or_else(|| AppError::Search("service unavailable".to_string()))
        }
    }

    const CITED_REPLY: &str =
        "Frank Herbert wrote Dune.\n\n{\"Wikipedia\": \"https://en.wikipedia.org/wiki/Dune_(novel)\"}";

    fn chatbot(llm: Arc<ScriptedLlm>, search: Arc<ScriptedSearch>) -> Chatbot {
        Chatbot::new(llm, search, GenerationSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_search_enabled_returns_sources() {
        let llm = ScriptedLlm::new(CITED_REPLY);
        let search = ScriptedSearch::ok("[1] Dune (novel)\nURL: https://en.wikipedia.org/wiki/Dune_(novel)");
        let bot = chatbot(llm.clone(), search.clone());

        let response = bot.generate_response("Who wrote Dune?", true).await.unwrap();

        assert_eq!(response.answer, "Frank Herbert wrote Dune.");
        assert_eq!(
            response.sources.get("Wikipedia").map(String::as_str),
            Some("https://en.wikipedia.org/wiki/Dune_(novel)")
        );
        assert_eq!(search.calls(), 1);
        assert_eq!(llm.calls(), 1);

        let request = llm.last_request();
        assert!(request.prompt.contains("User question: Who wrote Dune?"));
        assert!(request.prompt.contains("URL: https://en.wikipedia.org/wiki/Dune_(novel)"));
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_max_tokens_forwarded_to_completion() {
        let llm = ScriptedLlm::new("Short.");
        let settings = GenerationSettings {
            max_tokens: Some(64),
            ..GenerationSettings::default()
        };
        let bot = Chatbot::new(llm.clone(), ScriptedSearch::ok("ctx"), settings).unwrap();

        bot.generate_response("q", false).await.unwrap();
        assert_eq!(llm.last_request().max_tokens, Some(64));
    }

    #[tokio::test]
    async fn test_search_disabled_never_returns_sources() {
        let llm = ScriptedLlm::new(CITED_REPLY);
        let search = ScriptedSearch::ok("unused");
        let bot = chatbot(llm.clone(), search.clone());

        let response = bot.generate_response("Who wrote Dune?", false).await.unwrap();

        assert_eq!(response.answer, "Frank Herbert wrote Dune.");
        assert!(response.sources.is_empty());
        assert_eq!(search.calls(), 0);
        assert!(llm
            .last_request()
            .prompt
            .ends_with(&format!("Context:\n{}", NO_CONTEXT_MARKER)));
    }

    #[tokio::test]
    async fn test_empty_search_digest_yields_no_sources() {
        let llm = ScriptedLlm::new(CITED_REPLY);
        let bot = chatbot(llm, ScriptedSearch::ok(""));

        let response = bot.generate_response("Who wrote Dune?", true).await.unwrap();
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_plain_reply_is_trimmed() {
        let llm = ScriptedLlm::new("\n  Rust 1.0 shipped in May 2015.  \n");
        let bot = chatbot(llm, ScriptedSearch::ok("ctx"));

        let response = bot.generate_response("When did Rust 1.0 ship?", true).await.unwrap();
        assert_eq!(response.answer, "Rust 1.0 shipped in May 2015.");
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_skips_completion() {
        let llm = ScriptedLlm::new(CITED_REPLY);
        let search = ScriptedSearch::down();
        let retrying = Arc::new(RetryingSearchClient::new(
            search.clone(),
            RetryPolicy::new(5).with_initial_backoff(Duration::ZERO),
        ));
        let bot = Chatbot::new(llm.clone(), retrying, GenerationSettings::default()).unwrap();

        let result = bot.generate_response("Who wrote Dune?", true).await;

        assert!(matches!(result, Err(AppError::Search(_))));
        assert_eq!(search.calls(), 5);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_chatbot() {
        let llm = ScriptedLlm::new(CITED_REPLY);
        let bot = Arc::new(chatbot(llm.clone(), ScriptedSearch::ok("ctx")));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let bot = Arc::clone(&bot);
                tokio::spawn(async move { bot.generate_response("q", i % 2 == 0).await })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.has_sources(), i % 2 == 0);
        }
        assert_eq!(llm.calls(), 4);
    }

    #[test]
    fn test_from_config_reports_every_missing_credential() {
        let config = AppConfig::default().chatbot_config_with(|_| None);

        match Chatbot::from_config(&config) {
            Err(AppError::Config(message)) => {
                assert!(message.contains("OPENAI_API_KEY"));
                assert!(message.contains("TAVILY_API_KEY"));
            }
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected configuration error"),
        }
    }

    #[test]
    fn test_from_config_with_credentials() {
        let mut app = AppConfig::default();
        app.llm.model = "gpt-4o-mini".to_string();
        app.llm.temperature = 0.0;
        app.llm.max_tokens = Some(256);
        let config = app.chatbot_config_with(|name| Some(format!("{}-value", name)));

        let bot = Chatbot::from_config(&config).unwrap();
        assert_eq!(bot.settings().model, "gpt-4o-mini");
        assert_eq!(bot.settings().temperature, 0.0);
        assert_eq!(bot.settings().max_tokens, Some(256));
    }
}
