//! Telegram Bot API notifications.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MonitorError;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Longest text the Bot API accepts in one message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Boxed future returned by [`Notifier::send`].
pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), MonitorError>> + Send + 'a>>;

/// Delivers a text message to whoever is listening.
pub trait Notifier: Send + Sync {
    fn send<'a>(&'a self, text: &'a str) -> NotifyFuture<'a>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct RawResponse {
    ok: bool,
    description: Option<String>,
}

/// Sends messages to one chat through a bot.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recap-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MonitorError::Notify(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: TELEGRAM_API_URL.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send_chunked(&self, text: &str) -> Result<(), MonitorError> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        if chunks.len() > 1 {
            debug!("Splitting {} chars into {} messages", text.chars().count(), chunks.len());
        }
        for chunk in chunks {
            self.send_message(chunk).await?;
        }
        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<(), MonitorError> {
        // The token is part of the path; keep it out of logs and errors.
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        debug!("Telegram sendMessage to chat {} ({} bytes)", self.chat_id, text.len());

        let resp = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| MonitorError::Notify(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MonitorError::Notify(e.without_url().to_string()))?;

        match serde_json::from_str::<RawResponse>(&body) {
            Ok(parsed) if parsed.ok => Ok(()),
            Ok(parsed) => Err(MonitorError::Notify(
                parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            )),
            Err(_) => Err(MonitorError::Notify(format!("HTTP {status}: {body}"))),
        }
    }
}

impl Notifier for TelegramNotifier {
    fn send<'a>(&'a self, text: &'a str) -> NotifyFuture<'a> {
        Box::pin(self.send_chunked(text))
    }
}

/// Split `text` into pieces of at most `limit` chars, breaking at the last
/// whitespace before the limit. A word longer than `limit` is cut mid-word.
pub fn split_message(text: &str, limit: usize) -> Vec<&str> {
    assert!(limit > 0, "limit must be non-zero");
    let mut chunks = Vec::new();
    let mut rest = text;
    while let Some((limit_at, _)) = rest.char_indices().nth(limit) {
        let (head, _) = rest.split_at(limit_at);
        let cut = match head.rfind(char::is_whitespace) {
            Some(space) if space > 0 => space,
            _ => limit_at,
        };
        let (chunk, tail) = rest.split_at(cut);
        let chunk = chunk.trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        rest = tail.trim_start();
    }
    if chunks.is_empty() {
        chunks.push(rest);
    } else if !rest.trim_end().is_empty() {
        chunks.push(rest.trim_end());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_chat_id_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": "-1001",
                "text": "hello"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "result": {} })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new("123:abc", "-1001")
            .unwrap()
            .with_api_url(server.uri());
        notifier.send("hello").await.unwrap();
    }

    #[test]
    fn split_prefers_whitespace() {
        assert_eq!(split_message("short", 4096), vec!["short"]);
        assert_eq!(
            split_message("alpha beta gamma delta", 11),
            vec!["alpha beta", "gamma delta"]
        );
        assert_eq!(split_message("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(split_message("ééééé", 2), vec!["éé", "éé", "é"]);
        assert_eq!(split_message("", 10), vec![""]);
    }

    #[tokio::test]
    async fn long_text_is_sent_in_pieces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new("t", "c")
            .unwrap()
            .with_api_url(server.uri());
        let text = "word ".repeat(1_000);
        notifier.send(&text).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let sent: Vec<String> = requests
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["text"].as_str().unwrap().to_string()
            })
            .collect();
        assert!(sent.iter().all(|t| t.chars().count() <= MAX_MESSAGE_CHARS));
        assert_eq!(sent.join(" "), text.trim_end());
    }

    #[tokio::test]
    async fn not_ok_is_notify_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new("t", "missing")
            .unwrap()
            .with_api_url(server.uri());
        let err = notifier.send("hello").await.unwrap_err();
        match err {
            MonitorError::Notify(message) => assert_eq!(message, "Bad Request: chat not found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_notify_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new("t", "c")
            .unwrap()
            .with_api_url(server.uri());
        let err = notifier.send("hello").await.unwrap_err();
        assert!(err.to_string().contains("bad gateway"));
    }
}
