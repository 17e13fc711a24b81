//! Convenience re-exports for common `recap-rs` types.
//!
//! ```ignore
//! use recap_rs::prelude::*;
//! ```

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{ConfigError, LanguageModelError, MonitorError, SummarizeError};

// ── Models and backends ─────────────────────────────────────────────
pub use crate::api::{
    ChatFuture, DEFAULT_OLLAMA_HOST, LanguageModelClient, OllamaClient, OpenRouterClient,
    RetryConfig, retry_transient,
};
pub use crate::model::{ModelProfile, ModelRegistry};

// ── Summarization ───────────────────────────────────────────────────
pub use crate::summarize::{
    EventHandler, FnEventHandler, LoggingHandler, NoopHandler, RecursiveSummarizer,
    SummarizationRequest, Summary, SummarizerConfig, SummaryEvent, TokenEstimator,
    WordRatioEstimator,
};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::{Backend, RecapConfig};

// ── Monitoring ──────────────────────────────────────────────────────
pub use crate::monitor::{
    LastSeenStore, Monitor, MonitorConfig, MonitorReport, Notifier, TelegramNotifier,
    VideoSource, YouTubeSource,
};
