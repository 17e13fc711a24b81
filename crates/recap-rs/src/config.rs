//! Application configuration with sensible defaults.
//!
//! [`RecapConfig`] holds everything the `recap` binary can tune and converts it
//! into library types: [`build_summarizer_config`](RecapConfig::build_summarizer_config),
//! [`build_registry`](RecapConfig::build_registry),
//! [`build_monitor_config`](RecapConfig::build_monitor_config) and
//! [`build_client`](RecapConfig::build_client). Secrets and hosts come from
//! the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::{
    DEFAULT_OLLAMA_HOST, LanguageModelClient, OllamaClient, OpenRouterClient, RetryConfig,
};
use crate::error::{ConfigError, SummarizeError};
use crate::model::{ModelProfile, ModelRegistry};
use crate::monitor::MonitorConfig;
use crate::summarize::{DEFAULT_MAX_ROUNDS, DEFAULT_REPLY_RESERVE, SummarizerConfig};

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const CHAT_ID_ENV: &str = "CHAT_ID";
pub const OPENROUTER_KEY_ENV: &str = "OPENROUTER_KEY";
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Which language-model service answers the prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Ollama,
    OpenRouter,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(Backend::Ollama),
            "openrouter" => Ok(Backend::OpenRouter),
            other => Err(format!("unknown backend '{other}' (expected ollama or openrouter)")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Ollama => f.write_str("ollama"),
            Backend::OpenRouter => f.write_str("openrouter"),
        }
    }
}

/// Configuration for the `recap` binary.
#[derive(Debug, Clone)]
pub struct RecapConfig {
    /// Default: [`Backend::Ollama`].
    pub backend: Backend,
    /// Model identifier. Default: `"mistral-nemo"`.
    pub model: String,
    /// Context size per model call. Default: `16000`.
    pub context_tokens: usize,
    /// Tokens kept free for each reply. Default: `600`.
    pub reply_reserve: usize,
    /// Maximum reduction rounds. Default: `8`.
    pub max_rounds: u32,
    /// Pages summarized at once. Default: `1`.
    pub page_concurrency: usize,
    /// Per model call limit enforced by the summarizer. Default: none.
    pub call_timeout: Option<Duration>,
    /// HTTP timeout of the backend client. Default: 10 minutes.
    pub http_timeout: Duration,
    /// Profiles added to (or replacing) the built-in model table.
    pub extra_models: Vec<ModelProfile>,
    /// Retries of a whole summarization on transient failures. Default: `2`.
    pub retries: u32,
    /// Last-seen store. Default: `"data/latest_videos.json"`.
    pub state_path: PathBuf,
    /// Default: `"data/captions"`.
    pub captions_dir: PathBuf,
    /// Default: `"en"`.
    pub caption_language: String,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model: "mistral-nemo".to_string(),
            context_tokens: 16_000,
            reply_reserve: DEFAULT_REPLY_RESERVE,
            max_rounds: DEFAULT_MAX_ROUNDS,
            page_concurrency: 1,
            call_timeout: None,
            http_timeout: Duration::from_secs(600),
            extra_models: Vec::new(),
            retries: 2,
            state_path: PathBuf::from("data/latest_videos.json"),
            captions_dir: PathBuf::from("data/captions"),
            caption_language: "en".to_string(),
        }
    }
}

impl RecapConfig {
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_context_tokens(mut self, tokens: usize) -> Self {
        self.context_tokens = tokens;
        self
    }

    pub fn with_reply_reserve(mut self, tokens: usize) -> Self {
        self.reply_reserve = tokens;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_page_concurrency(mut self, concurrency: usize) -> Self {
        self.page_concurrency = concurrency;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_model_profile(mut self, profile: ModelProfile) -> Self {
        self.extra_models.push(profile);
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    pub fn with_captions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.captions_dir = dir.into();
        self
    }

    pub fn build_summarizer_config(&self) -> SummarizerConfig {
        let config = SummarizerConfig::default()
            .with_reply_reserve(self.reply_reserve)
            .with_max_rounds(self.max_rounds)
            .with_page_concurrency(self.page_concurrency);
        match self.call_timeout {
            Some(timeout) => config.with_call_timeout(timeout),
            None => config,
        }
    }

    /// The built-in model table plus [`extra_models`](Self::extra_models).
    pub fn build_registry(&self) -> ModelRegistry {
        let mut registry = ModelRegistry::default();
        for profile in &self.extra_models {
            registry.register(profile.clone());
        }
        registry
    }

    pub fn build_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            model: self.model.clone(),
            context_tokens: self.context_tokens,
            caption_language: self.caption_language.clone(),
            captions_dir: self.captions_dir.clone(),
            retry: RetryConfig::with_retries(self.retries),
        }
    }

    /// Build the backend client, reading hosts and keys from the process
    /// environment.
    pub fn build_client(&self) -> Result<Box<dyn LanguageModelClient>, SummarizeError> {
        self.build_client_with(|name| std::env::var(name).ok())
    }

    /// Build the backend client with an explicit environment lookup.
    pub fn build_client_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Box<dyn LanguageModelClient>, SummarizeError> {
        match self.backend {
            Backend::Ollama => {
                let host = env(OLLAMA_HOST_ENV)
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());
                Ok(Box::new(OllamaClient::with_timeout(host, self.http_timeout)?))
            }
            Backend::OpenRouter => {
                let key = require(&env, OPENROUTER_KEY_ENV)?;
                let max_tokens = u32::try_from(self.reply_reserve).unwrap_or(u32::MAX);
                let client = OpenRouterClient::with_timeout(key, self.http_timeout)?
                    .with_max_tokens(max_tokens);
                Ok(Box::new(client))
            }
        }
    }
}

/// Telegram bot token and chat id from the process environment.
pub fn telegram_credentials() -> Result<(String, String), ConfigError> {
    telegram_credentials_with(|name| std::env::var(name).ok())
}

pub fn telegram_credentials_with(
    env: impl Fn(&str) -> Option<String>,
) -> Result<(String, String), ConfigError> {
    Ok((require(&env, TELEGRAM_TOKEN_ENV)?, require(&env, CHAT_ID_ENV)?))
}

fn require(env: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    env(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}
