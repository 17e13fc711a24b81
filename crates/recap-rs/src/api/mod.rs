//! Language-model backends and the boundary the summarizer calls through.
//!
//! - [`client`]: the [`LanguageModelClient`] trait. One prompt in, one reply
//!   out, with the call's context size passed along.
//! - [`ollama`]: locally served models via Ollama's `/api/chat`.
//! - [`openrouter`]: hosted models via OpenRouter chat completions.
//! - [`retry`]: backoff policy for callers that choose to retry transient
//!   failures. The summarizer itself never retries.

pub mod client;
pub mod ollama;
pub mod openrouter;
pub mod retry;

pub use client::{ChatFuture, LanguageModelClient};
pub use ollama::{DEFAULT_OLLAMA_HOST, OllamaClient};
pub use openrouter::{OPENROUTER_URL, OpenRouterClient};
pub use retry::{RetryConfig, Retryable, retry_transient};
