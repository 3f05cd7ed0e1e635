//! Configuration management for Websage.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.websage/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! `AppConfig` is the bootstrap-level view. The chatbot itself is built from a
//! `ChatbotConfig`, which carries resolved secrets and is validated once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::retry::RetryPolicy;

/// Environment variable holding the completion provider credential.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable holding the search provider credential.
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Timeout applied to every outbound provider HTTP request, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Completion providers that need no credential.
const KEYLESS_PROVIDERS: &[&str] = &["ollama"];

/// Canonical form of a provider name: trimmed, lowercase.
pub fn normalize_provider(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .websage/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider settings
    pub llm: LlmSettings,

    /// Web search provider settings
    pub search: SearchSettings,

    /// Retry policy applied to both providers
    pub retry: RetryPolicy,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Completion provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider name ("openai" or "ollama")
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional completion length cap
    #[serde(rename = "maxTokens", default)]
    pub max_tokens: Option<u32>,

    /// Optional custom endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default = "default_openai_key_env")]
    pub api_key_env: String,
}

/// Web search provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Provider name ("tavily")
    #[serde(default = "default_search_provider")]
    pub provider: String,

    /// Optional custom endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Number of results folded into the digest
    #[serde(rename = "maxResults", default = "default_max_results")]
    pub max_results: u32,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default = "default_tavily_key_env")]
    pub api_key_env: String,
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_openai_key_env() -> String {
    OPENAI_API_KEY_ENV.to_string()
}

fn default_search_provider() -> String {
    "tavily".to_string()
}

fn default_max_results() -> u32 {
    5
}

fn default_tavily_key_env() -> String {
    TAVILY_API_KEY_ENV.to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            endpoint: None,
            api_key_env: default_openai_key_env(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            endpoint: None,
            max_results: default_max_results(),
            api_key_env: default_tavily_key_env(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    search: Option<SearchSettings>,
    retry: Option<RetryPolicy>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            llm: LlmSettings::default(),
            search: SearchSettings::default(),
            retry: RetryPolicy::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment
    /// variables.
    ///
    /// Environment variables:
    /// - `WEBSAGE_WORKSPACE`: Override workspace path
    /// - `WEBSAGE_CONFIG`: Path to config file
    /// - `WEBSAGE_PROVIDER`: Completion provider
    /// - `WEBSAGE_MODEL`: Model identifier
    /// - `WEBSAGE_TEMPERATURE`: Sampling temperature
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use websage_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.llm.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, with explicit workspace and config file paths
    /// (from CLI flags) taking precedence over `WEBSAGE_WORKSPACE` and
    /// `WEBSAGE_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("WEBSAGE_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("WEBSAGE_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config.config_path();
        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("WEBSAGE_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("WEBSAGE_MODEL") {
            config.llm.model = model;
        }

        if let Ok(temperature) = std::env::var("WEBSAGE_TEMPERATURE") {
            config.llm.temperature = temperature.parse().map_err(|e| {
                AppError::Config(format!(
                    "Invalid WEBSAGE_TEMPERATURE '{}': {}",
                    temperature, e
                ))
            })?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        config.normalize();
        Ok(config)
    }

    /// Path of the YAML config file this configuration reads.
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.websage_dir().join("config.yaml"))
    }

    /// Merge YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(retry) = config_file.retry {
            result.retry = retry;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result.normalize();
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        temperature: Option<f32>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(temperature) = temperature {
            self.llm.temperature = temperature;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self.normalize();
        self
    }

    /// Bring provider names to their canonical form.
    fn normalize(&mut self) {
        self.llm.provider = normalize_provider(&self.llm.provider);
        self.search.provider = normalize_provider(&self.search.provider);
    }

    /// Get the path to the .websage directory.
    pub fn websage_dir(&self) -> PathBuf {
        self.workspace.join(".websage")
    }

    /// Resolve secrets from the process environment into a `ChatbotConfig`.
    pub fn chatbot_config(&self) -> ChatbotConfig {
        self.chatbot_config_with(|name| std::env::var(name).ok())
    }

    /// Resolve secrets through `lookup` into a `ChatbotConfig`.
    ///
    /// Blank values count as absent.
    pub fn chatbot_config_with<F>(&self, lookup: F) -> ChatbotConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        ChatbotConfig {
            completion: CompletionConfig {
                provider: self.llm.provider.clone(),
                model: self.llm.model.clone(),
                temperature: self.llm.temperature,
                max_tokens: self.llm.max_tokens,
                endpoint: self.llm.endpoint.clone(),
                api_key_env: self.llm.api_key_env.clone(),
                api_key: resolve(&self.llm.api_key_env),
            },
            search: SearchConfig {
                provider: self.search.provider.clone(),
                endpoint: self.search.endpoint.clone(),
                max_results: self.search.max_results,
                api_key_env: self.search.api_key_env.clone(),
                api_key: resolve(&self.search.api_key_env),
            },
            retry: self.retry,
        }
    }
}

/// Explicit configuration the chatbot is constructed from.
///
/// Immutable once built; holds every credential the providers need.
#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    /// Completion provider configuration
    pub completion: CompletionConfig,

    /// Search provider configuration
    pub search: SearchConfig,

    /// Retry policy for both providers
    pub retry: RetryPolicy,
}

/// Resolved completion provider configuration.
#[derive(Clone)]
pub struct CompletionConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub endpoint: Option<String>,
    /// Name of the credential, reported when it is missing
    pub api_key_env: String,
    pub api_key: Option<String>,
}

/// Resolved search provider configuration.
#[derive(Clone)]
pub struct SearchConfig {
    pub provider: String,
    pub endpoint: Option<String>,
    pub max_results: u32,
    /// Name of the credential, reported when it is missing
    pub api_key_env: String,
    pub api_key: Option<String>,
}

/// Stand-in printed for a present secret.
const REDACTED: &str = "<redacted>";

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| REDACTED)
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("endpoint", &self.endpoint)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("max_results", &self.max_results)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl CompletionConfig {
    /// Whether the configured provider needs a credential.
    pub fn requires_api_key(&self) -> bool {
        !KEYLESS_PROVIDERS.contains(&normalize_provider(&self.provider).as_str())
    }
}

impl ChatbotConfig {
    /// Names of every required credential that is absent.
    pub fn missing_credentials(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.completion.requires_api_key() && self.completion.api_key.is_none() {
            missing.push(self.completion.api_key_env.clone());
        }

        if self.search.api_key.is_none() {
            missing.push(self.search.api_key_env.clone());
        }

        missing
    }

    /// Fail fast when any required credential is missing.
    ///
    /// The error lists every missing credential, not just the first.
    pub fn validate(&self) -> AppResult<()> {
        let missing = self.missing_credentials();

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required API key(s): {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}
