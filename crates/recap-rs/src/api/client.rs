//! The language-model boundary consumed by the summarizer.

use std::future::Future;
use std::pin::Pin;

use crate::error::LanguageModelError;

/// Boxed future returned by [`LanguageModelClient::chat`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, LanguageModelError>> + Send + 'a>>;

/// A backend that turns one prompt into one reply.
///
/// `context_tokens` is passed through to the backend as an upper bound on the
/// call's context size; clients must not truncate `prompt` themselves.
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// impl LanguageModelClient for Echo {
///     fn chat<'a>(&'a self, _model: &'a str, prompt: &'a str, _ctx: usize) -> ChatFuture<'a> {
///         Box::pin(async move { Ok(prompt.to_string()) })
///     }
/// }
/// ```
pub trait LanguageModelClient: Send + Sync {
    fn chat<'a>(&'a self, model: &'a str, prompt: &'a str, context_tokens: usize) -> ChatFuture<'a>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str {
        "custom"
    }
}

impl<T: LanguageModelClient + ?Sized> LanguageModelClient for &T {
    fn chat<'a>(&'a self, model: &'a str, prompt: &'a str, context_tokens: usize) -> ChatFuture<'a> {
        (**self).chat(model, prompt, context_tokens)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<T: LanguageModelClient + ?Sized> LanguageModelClient for Box<T> {
    fn chat<'a>(&'a self, model: &'a str, prompt: &'a str, context_tokens: usize) -> ChatFuture<'a> {
        (**self).chat(model, prompt, context_tokens)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
