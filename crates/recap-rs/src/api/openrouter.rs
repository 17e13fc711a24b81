//! OpenRouter backend: hosted models behind the chat completions API.
//!
//! OpenRouter sizes the context window per model, so `context_tokens` is
//! only logged; the reply is bounded by the client's `max_tokens`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::client::{ChatFuture, LanguageModelClient};
use crate::error::LanguageModelError;

/// OpenRouter chat completions endpoint.
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const BACKEND: &str = "OpenRouter";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<RawError>,
    usage: Option<RawUsage>,
}

#[derive(Deserialize)]
struct RawChoice {
    message: RawMessage,
}

#[derive(Deserialize)]
struct RawMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RawError {
    message: String,
}

#[derive(Deserialize)]
struct RawUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

/// Async HTTP client for the OpenRouter chat completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LanguageModelError> {
        Self::with_timeout(api_key, Duration::from_secs(120))
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LanguageModelError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recap-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LanguageModelError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            url: OPENROUTER_URL.to_string(),
            timeout,
            max_tokens: 600,
            temperature: 0.3,
        })
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Cap on reply tokens; usually the summarizer's reply reserve.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn send(
        &self,
        model: &str,
        prompt: &str,
        context_tokens: usize,
    ) -> Result<String, LanguageModelError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        debug!(
            "LLM request: model={model}, context={context_tokens}, max_tokens={}, temp={}",
            body.max_tokens, body.temperature,
        );
        trace!("Request prompt size: {} bytes", prompt.len());

        let start = Instant::now();
        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", "recap-rs")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
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

        let parsed: RawChatResponse = serde_json::from_str(&text)
            .map_err(|e| LanguageModelError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(LanguageModelError::Api {
                backend: BACKEND,
                message: err.message,
            });
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
            );
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .ok_or_else(|| LanguageModelError::InvalidResponse("response has no content".into()))
    }

    fn transport_error(&self, e: reqwest::Error) -> LanguageModelError {
        if e.is_timeout() {
            LanguageModelError::Timeout(self.timeout)
        } else {
            LanguageModelError::Transport(e.to_string())
        }
    }
}

impl LanguageModelClient for OpenRouterClient {
    fn chat<'a>(&'a self, model: &'a str, prompt: &'a str, context_tokens: usize) -> ChatFuture<'a> {
        Box::pin(self.send(model, prompt, context_tokens))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
