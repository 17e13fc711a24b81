//! Ollama backend: a locally served model behind `/api/chat`.
//!
//! The call's context size travels as `options.num_ctx`, so Ollama allocates
//! exactly the window the summarizer budgeted for.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{ChatFuture, LanguageModelClient};
use crate::error::LanguageModelError;

/// Where `ollama serve` listens by default.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Local models can take minutes on long pages.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const BACKEND: &str = "Ollama";

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_ctx: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Option<OllamaReply>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    content: String,
}

/// Async HTTP client for an Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a client for the server at `base_url` with a 10 minute timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, LanguageModelError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests fail with [`LanguageModelError::Timeout`]
    /// after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LanguageModelError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recap-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LanguageModelError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    async fn send(
        &self,
        model: &str,
        prompt: &str,
        context_tokens: usize,
    ) -> Result<String, LanguageModelError> {
        let body = OllamaRequest {
            model,
            messages: vec![OllamaMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: OllamaOptions {
                num_ctx: context_tokens,
            },
        };
        debug!(
            "Ollama request: model={model}, num_ctx={context_tokens}, prompt={} bytes",
            prompt.len()
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        debug!(
            "Ollama response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(LanguageModelError::Http {
                backend: BACKEND,
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: OllamaResponse = serde_json::from_str(&text)
            .map_err(|e| LanguageModelError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if let Some(message) = parsed.error {
            return Err(LanguageModelError::Api {
                backend: BACKEND,
                message,
            });
        }

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| LanguageModelError::InvalidResponse("response has no message".into()))
    }

    fn transport_error(&self, e: reqwest::Error) -> LanguageModelError {
        if e.is_timeout() {
            LanguageModelError::Timeout(self.timeout)
        } else {
            LanguageModelError::Transport(e.to_string())
        }
    }
}

impl LanguageModelClient for OllamaClient {
    fn chat<'a>(&'a self, model: &'a str, prompt: &'a str, context_tokens: usize) -> ChatFuture<'a> {
        Box::pin(self.send(model, prompt, context_tokens))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
