//! Context-bounded summarization of long texts with local or hosted language
//! models, plus a YouTube channel monitor that posts caption summaries to
//! Telegram.
//!
//! The core is [`RecursiveSummarizer`](summarize::RecursiveSummarizer): text
//! that fits the model's context window is summarized in one call; longer text
//! is split into word-aligned pages, each page is summarized, and the joined
//! page summaries are summarized again until they fit.
//!
//! ```ignore
//! use recap_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SummarizeError> {
//!     let client = OllamaClient::new(DEFAULT_OLLAMA_HOST)?;
//!     let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default())
//!         .with_event_handler(&LoggingHandler);
//!
//!     let text = std::fs::read_to_string("talk.txt").unwrap();
//!     let summary = summarizer.summarize(&text, "llama3", 8_000).await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Token budget and pagination:** [`summarize::estimator`] and
//!   [`summarize::pages`]. Swap the estimator with
//!   [`RecursiveSummarizer::with_estimator`](summarize::RecursiveSummarizer::with_estimator).
//!
//! - **Model context windows:** [`model::ModelRegistry`]; unknown names are a
//!   [`ConfigError`](error::ConfigError).
//!
//! - **Backends:** implement [`LanguageModelClient`](api::LanguageModelClient)
//!   or use [`OllamaClient`](api::OllamaClient) /
//!   [`OpenRouterClient`](api::OpenRouterClient).
//!
//! - **Progress:** implement [`EventHandler`](summarize::EventHandler) or pass
//!   [`LoggingHandler`](summarize::LoggingHandler) to log through `tracing`.
//!
//! - **Channel monitoring:** [`monitor::Monitor`] with
//!   [`YouTubeSource`](monitor::YouTubeSource),
//!   [`LastSeenStore`](monitor::LastSeenStore) and
//!   [`TelegramNotifier`](monitor::TelegramNotifier).

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod prelude;
pub mod summarize;
