//! Error taxonomy.
//!
//! Budget problems ([`ConfigError`]) are detected before any model call is
//! made. Backend failures ([`LanguageModelError`]) abort the summarization
//! that triggered them; nothing here retries on its own; callers that want a
//! retry policy wrap the call themselves (see [`crate::api::retry`]).

use std::time::Duration;

use thiserror::Error;

/// Misconfiguration of the token budget or of the model table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested model has no registered profile.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// `context_tokens` is larger than the model's context window.
    #[error("context size {requested} exceeds the context window of '{model}' ({max} tokens)")]
    ContextExceedsModel {
        model: String,
        requested: usize,
        max: usize,
    },

    /// The reply reserve leaves no tokens for input.
    #[error("reply reserve {reserve} leaves no room in a context of {context} tokens")]
    ReserveExceedsContext { reserve: usize, context: usize },

    /// The per-call input budget is too small to hold a single word.
    #[error("input budget of {page_size} tokens cannot hold a single word")]
    NoRoomForInput { page_size: usize },

    /// A `name=tokens` model specification could not be parsed.
    #[error("invalid model specification '{0}' (expected NAME=TOKENS with TOKENS >= 1)")]
    InvalidModelSpec(String),

    /// A required environment variable is not set.
    #[error("{0} environment variable is not set")]
    MissingEnv(&'static str),
}

/// A language-model backend could not be reached or failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageModelError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{backend} HTTP {status}: {body}")]
    Http {
        backend: &'static str,
        status: u16,
        body: String,
    },

    /// The backend answered with an error payload.
    #[error("{backend} error: {message}")]
    Api {
        backend: &'static str,
        message: String,
    },

    /// The response body was not what the backend contract promises.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The call did not finish within the caller's deadline.
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

impl LanguageModelError {
    /// Whether a retry could plausibly succeed (rate limits, 5xx, network).
    ///
    /// 400/401/403/404/422 and malformed responses are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            LanguageModelError::Transport(_) | LanguageModelError::Timeout(_) => true,
            LanguageModelError::Http { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            LanguageModelError::Api { .. } | LanguageModelError::InvalidResponse(_) => false,
        }
    }
}

/// Failure of a whole summarization run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    LanguageModel(#[from] LanguageModelError),

    /// The reduced text still did not fit after the round cap.
    #[error("summary did not fit the context after {rounds} rounds ({words} words left)")]
    NotConverged { rounds: u32, words: usize },
}

impl SummarizeError {
    /// Whether the underlying cause is a transient backend failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, SummarizeError::LanguageModel(e) if e.is_transient())
    }
}

/// Failure while checking a channel or delivering its notifications.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// An expected field was missing from a scraped page.
    #[error("could not find {what} in {source_url}")]
    Extraction {
        what: &'static str,
        source_url: String,
    },

    #[error("captions are in '{found}', expected '{expected}'")]
    CaptionLanguage { expected: String, found: String },

    #[error("state file {path}: {message}")]
    State { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("notification failed: {0}")]
    Notify(String),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}
