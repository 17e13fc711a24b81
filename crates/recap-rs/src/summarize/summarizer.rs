//! Adaptive recursive summarization under a fixed context budget.
//!
//! A text that fits the model's context is summarized in one call. A text
//! that does not is split into word-aligned pages sized to the input budget
//! (`context_tokens - reply_reserve`), each page is summarized on its own,
//! and the page summaries, joined in page order, become the next round's
//! input. Rounds repeat until the text fits, bounded by
//! [`SummarizerConfig::max_rounds`].

use std::borrow::Cow;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt};

use super::estimator::{TokenEstimator, WordRatioEstimator};
use super::events::{EventHandler, NoopHandler, SummaryEvent};
use super::pages::{Page, paginate};
use crate::api::client::LanguageModelClient;
use crate::error::{ConfigError, LanguageModelError, SummarizeError};
use crate::model::{ModelProfile, ModelRegistry};

/// Instruction prepended to every text or page sent to the model.
pub const SUMMARY_PROMPT_PREFIX: &str = "Summarise the following text: ";

/// Tokens held back for the model's reply (~400 expected, +50% buffer).
pub const DEFAULT_REPLY_RESERVE: usize = 600;

/// Default cap on paginating rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 8;

/// Tuning for [`RecursiveSummarizer`].
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Tokens reserved for the model's output in every call.
    pub reply_reserve: usize,
    /// Maximum number of paginate-and-reduce rounds before giving up.
    pub max_rounds: u32,
    /// Page calls in flight at once. `1` issues and awaits them one by one.
    pub page_concurrency: usize,
    /// Deadline for a single model call.
    pub call_timeout: Option<Duration>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            reply_reserve: DEFAULT_REPLY_RESERVE,
            max_rounds: DEFAULT_MAX_ROUNDS,
            page_concurrency: 1,
            call_timeout: None,
        }
    }
}

impl SummarizerConfig {
    pub fn with_reply_reserve(mut self, tokens: usize) -> Self {
        self.reply_reserve = tokens;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Values below 1 are treated as 1.
    pub fn with_page_concurrency(mut self, concurrency: usize) -> Self {
        self.page_concurrency = concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

/// One summarization job: the text, the model, and its token budget.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    pub text: String,
    pub model: ModelProfile,
    /// Context size passed to every call.
    pub context_tokens: usize,
    /// Tokens reserved for the reply in every call. [`new`](Self::new) uses
    /// [`DEFAULT_REPLY_RESERVE`]; [`RecursiveSummarizer::request`] uses the
    /// summarizer's configured value.
    pub reply_reserve: usize,
}

impl SummarizationRequest {
    pub fn new(text: impl Into<String>, model: ModelProfile, context_tokens: usize) -> Self {
        Self {
            text: text.into(),
            model,
            context_tokens,
            reply_reserve: DEFAULT_REPLY_RESERVE,
        }
    }

    pub fn with_reply_reserve(mut self, tokens: usize) -> Self {
        self.reply_reserve = tokens;
        self
    }

    /// Check the budget and return the page size in words.
    ///
    /// Fails when the context exceeds the model's window, when the reply
    /// reserve swallows the whole context, or when the remaining input
    /// budget cannot hold one word.
    pub fn words_per_page(&self, estimator: &dyn TokenEstimator) -> Result<usize, ConfigError> {
        if self.context_tokens > self.model.max_context {
            return Err(ConfigError::ContextExceedsModel {
                model: self.model.name.clone(),
                requested: self.context_tokens,
                max: self.model.max_context,
            });
        }
        if self.reply_reserve >= self.context_tokens {
            return Err(ConfigError::ReserveExceedsContext {
                reserve: self.reply_reserve,
                context: self.context_tokens,
            });
        }
        let page_size = self.context_tokens - self.reply_reserve;
        match estimator.words_within(page_size) {
            0 => Err(ConfigError::NoRoomForInput { page_size }),
            words => Ok(words),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    /// Paginating rounds performed (0 when the input fit in one call).
    pub rounds: u32,
    pub model_calls: usize,
}

/// Summarizes arbitrarily long text with a context-bounded model.
///
/// # Example
///
/// ```ignore
/// let client = OllamaClient::new(DEFAULT_OLLAMA_HOST)?;
/// let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default())
///     .with_event_handler(&LoggingHandler);
///
/// let summary = summarizer.summarize(&captions, "mistral-nemo", 16_000).await?;
/// ```
pub struct RecursiveSummarizer<'a> {
    client: &'a dyn LanguageModelClient,
    registry: ModelRegistry,
    estimator: &'a dyn TokenEstimator,
    event_handler: &'a dyn EventHandler,
    config: SummarizerConfig,
}

impl<'a> RecursiveSummarizer<'a> {
    /// Create a summarizer with the built-in model table and the word-ratio estimator.
    pub fn new(client: &'a dyn LanguageModelClient, config: SummarizerConfig) -> Self {
        Self {
            client,
            registry: ModelRegistry::default(),
            estimator: &WordRatioEstimator,
            event_handler: &NoopHandler,
            config,
        }
    }

    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_estimator(mut self, estimator: &'a dyn TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Summarize `text` with the named model using `context_tokens` per call.
    pub async fn summarize(
        &self,
        text: &str,
        model: &str,
        context_tokens: usize,
    ) -> Result<String, SummarizeError> {
        let profile = self.registry.lookup(model)?.clone();
        let request = self.request(text, profile, context_tokens);
        Ok(self.run(&request).await?.text)
    }

    /// A request carrying this summarizer's configured reply reserve.
    pub fn request(
        &self,
        text: impl Into<String>,
        model: ModelProfile,
        context_tokens: usize,
    ) -> SummarizationRequest {
        SummarizationRequest::new(text, model, context_tokens)
            .with_reply_reserve(self.config.reply_reserve)
    }

    /// Run a fully specified request.
    ///
    /// The budget comes from the request alone; build it with
    /// [`request`](Self::request) to apply the configured reply reserve.
    /// Any model error aborts the run; completed page summaries are discarded.
    pub async fn run(&self, request: &SummarizationRequest) -> Result<Summary, SummarizeError> {
        let words_per_page = request.words_per_page(self.estimator)?;
        let model = request.model.name.as_str();
        let context_tokens = request.context_tokens;

        let mut text = Cow::Borrowed(request.text.as_str());
        let mut rounds = 0u32;
        let mut model_calls = 0usize;

        loop {
            let words: Vec<&str> = text.split_whitespace().collect();
            let estimated_tokens = self.estimator.estimate(&text);
            self.event_handler.on_event(&SummaryEvent::Estimated {
                round: rounds,
                words: words.len(),
                estimated_tokens,
                context_tokens,
            });

            if estimated_tokens <= context_tokens {
                self.event_handler.on_event(&SummaryEvent::SingleShot {
                    round: rounds,
                    words: words.len(),
                });
                let prompt = format!("{SUMMARY_PROMPT_PREFIX}{text}");
                let reply = self.call(model, &prompt, context_tokens).await?;
                model_calls += 1;
                self.event_handler.on_event(&SummaryEvent::Finished {
                    rounds,
                    model_calls,
                });
                return Ok(Summary {
                    text: reply,
                    rounds,
                    model_calls,
                });
            }

            if rounds >= self.config.max_rounds {
                return Err(SummarizeError::NotConverged {
                    rounds,
                    words: words.len(),
                });
            }
            rounds += 1;

            let pages = paginate(&words, words_per_page);
            self.event_handler.on_event(&SummaryEvent::Paginated {
                round: rounds,
                pages: pages.len(),
                words_per_page,
            });

            let replies = self
                .summarize_pages(rounds, model, &pages, context_tokens)
                .await?;
            model_calls += replies.len();

            let reduced = replies.join(" ");
            self.event_handler.on_event(&SummaryEvent::Reduced {
                round: rounds,
                words_before: words.len(),
                words_after: reduced.split_whitespace().count(),
            });
            text = Cow::Owned(reduced);
        }
    }

    /// Summarize every page, returning replies in page order.
    async fn summarize_pages(
        &self,
        round: u32,
        model: &str,
        pages: &[Page<'_>],
        context_tokens: usize,
    ) -> Result<Vec<String>, LanguageModelError> {
        let total = pages.len();
        futures::stream::iter(pages)
            .map(|page| async move {
                let prompt = format!("{SUMMARY_PROMPT_PREFIX}{}", page.text());
                let reply = self.call(model, &prompt, context_tokens).await?;
                self.event_handler.on_event(&SummaryEvent::PageSummarized {
                    round,
                    page: page.index,
                    pages: total,
                    reply: &reply,
                });
                Ok::<_, LanguageModelError>(reply)
            })
            .buffered(self.config.page_concurrency.max(1))
            .try_collect()
            .await
    }

    async fn call(
        &self,
        model: &str,
        prompt: &str,
        context_tokens: usize,
    ) -> Result<String, LanguageModelError> {
        let call = self.client.chat(model, prompt, context_tokens);
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LanguageModelError::Timeout(limit))?,
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ChatFuture;
    use crate::summarize::events::FnEventHandler;
    use std::sync::Mutex;

    type ReplyFn = dyn Fn(usize, &str) -> Result<String, LanguageModelError> + Send + Sync;

    /// Records every prompt and answers through a scripted closure
    /// that receives the zero-based call number and the page text.
    struct ScriptedClient {
        calls: Mutex<Vec<(String, usize)>>,
        reply: Box<ReplyFn>,
    }

    impl ScriptedClient {
        fn new(
            reply: impl Fn(usize, &str) -> Result<String, LanguageModelError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Box::new(reply),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(p, _)| p.clone())
                .collect()
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl LanguageModelClient for ScriptedClient {
        fn chat<'a>(
            &'a self,
            _model: &'a str,
            prompt: &'a str,
            context_tokens: usize,
        ) -> ChatFuture<'a> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((prompt.to_string(), context_tokens));
                calls.len() - 1
            };
            let body = prompt.strip_prefix(SUMMARY_PROMPT_PREFIX).unwrap_or(prompt);
            let result = (self.reply)(index, body);
            Box::pin(async move { result })
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn llama3() -> ModelProfile {
        ModelRegistry::default().lookup("llama3").unwrap().clone()
    }

    fn page_word_counts(prompts: &[String]) -> Vec<usize> {
        prompts
            .iter()
            .map(|p| {
                p.strip_prefix(SUMMARY_PROMPT_PREFIX)
                    .unwrap()
                    .split_whitespace()
                    .count()
            })
            .collect()
    }

    #[tokio::test]
    async fn short_text_is_one_call_with_full_text() {
        let client = ScriptedClient::new(|_, _| Ok("A tidy summary.".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());
        let text = words(100);

        let summary = summarizer
            .run(&SummarizationRequest::new(text.clone(), llama3(), 8_000))
            .await
            .unwrap();

        assert_eq!(summary.text, "A tidy summary.");
        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.model_calls, 1);
        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, format!("Summarise the following text: {text}"));
        assert_eq!(calls[0].1, 8_000);
    }

    #[tokio::test]
    async fn long_text_is_paginated_then_reduced() {
        let client = ScriptedClient::new(|_, _| Ok("short summary".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let summary = summarizer
            .run(&SummarizationRequest::new(words(20_000), llama3(), 8_000))
            .await
            .unwrap();

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 5);
        assert_eq!(page_word_counts(&prompts[..4]), vec![5_550, 5_550, 5_550, 3_350]);
        assert_eq!(
            prompts[4],
            "Summarise the following text: short summary short summary short summary short summary"
        );
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.model_calls, 5);
        assert!(client.calls.lock().unwrap().iter().all(|(_, ctx)| *ctx == 8_000));
    }

    #[tokio::test]
    async fn pages_cover_text_in_order() {
        let client = ScriptedClient::new(|_, _| Ok("ok".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());
        let text = words(20_000);

        summarizer
            .run(&SummarizationRequest::new(text.clone(), llama3(), 8_000))
            .await
            .unwrap();

        let prompts = client.prompts();
        let rejoined = prompts[..4]
            .iter()
            .map(|p| p.strip_prefix(SUMMARY_PROMPT_PREFIX).unwrap())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, text);
    }

    #[tokio::test]
    async fn reserve_larger_than_context_fails_before_any_call() {
        let client = ScriptedClient::new(|_, _| Ok("unused".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let err = summarizer
            .run(&SummarizationRequest::new(words(10), llama3(), 500))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SummarizeError::Config(ConfigError::ReserveExceedsContext {
                reserve: 600,
                context: 500
            })
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn context_beyond_model_window_is_rejected() {
        let client = ScriptedClient::new(|_, _| Ok("unused".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let err = summarizer.summarize("hello", "llama3", 9_000).await.unwrap_err();

        assert!(matches!(
            err,
            SummarizeError::Config(ConfigError::ContextExceedsModel { requested: 9_000, max: 8_000, .. })
        ));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let client = ScriptedClient::new(|_, _| Ok("unused".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let err = summarizer.summarize("hello", "gpt-17", 4_000).await.unwrap_err();

        assert_eq!(
            err,
            SummarizeError::Config(ConfigError::UnknownModel("gpt-17".into()))
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn one_token_input_budget_is_rejected() {
        let client = ScriptedClient::new(|_, _| Ok("unused".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let err = summarizer.summarize("hello", "llama3", 601).await.unwrap_err();

        assert_eq!(
            err,
            SummarizeError::Config(ConfigError::NoRoomForInput { page_size: 1 })
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn page_failure_aborts_whole_run() {
        let client = ScriptedClient::new(|index, _| {
            if index == 1 {
                Err(LanguageModelError::Http {
                    backend: "Ollama",
                    status: 500,
                    body: "model crashed".into(),
                })
            } else {
                Ok("partial".into())
            }
        });
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let err = summarizer
            .run(&SummarizationRequest::new(words(20_000), llama3(), 8_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SummarizeError::LanguageModel(LanguageModelError::Http { status: 500, .. })
        ));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn verbose_model_hits_round_cap() {
        // Echoes every page back, so the text never shrinks.
        let client = ScriptedClient::new(|_, page| Ok(page.to_string()));
        let config = SummarizerConfig::default()
            .with_reply_reserve(8)
            .with_max_rounds(3);
        let summarizer = RecursiveSummarizer::new(&client, config);
        let model = ModelProfile::new("tiny", 20).unwrap();

        let err = summarizer
            .run(&SummarizationRequest::new(words(30), model, 20).with_reply_reserve(8))
            .await
            .unwrap_err();

        assert_eq!(err, SummarizeError::NotConverged { rounds: 3, words: 30 });
        // page_size 12 -> 9 words per page -> 4 pages per round.
        assert_eq!(client.call_count(), 12);
    }

    #[tokio::test]
    async fn multiple_rounds_until_fit() {
        // Each page collapses to two words.
        let client = ScriptedClient::new(|index, _| Ok(format!("s{index} t{index}")));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());
        let model = ModelProfile::new("tiny", 20).unwrap();

        let summary = summarizer
            .run(&SummarizationRequest::new(words(100), model, 20).with_reply_reserve(8))
            .await
            .unwrap();

        // Round 1: 100 words -> 12 pages -> 24 words (32 tokens > 20).
        // Round 2: 24 words -> 3 pages -> 6 words (8 tokens), then one final call.
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.model_calls, 12 + 3 + 1);
        assert_eq!(summary.text, "s15 t15");
        let prompts = client.prompts();
        assert_eq!(
            prompts[12],
            "Summarise the following text: s0 t0 s1 t1 s2 t2 s3 t3 s4"
        );
    }

    #[tokio::test]
    async fn empty_text_is_single_call() {
        let client = ScriptedClient::new(|_, _| Ok("nothing to say".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default());

        let summary = summarizer.summarize("", "llama3", 8_000).await.unwrap();

        assert_eq!(summary, "nothing to say");
        assert_eq!(client.prompts(), vec!["Summarise the following text: ".to_string()]);
    }

    #[tokio::test]
    async fn events_report_rounds_and_pages() {
        let client = ScriptedClient::new(|_, _| Ok("short summary".into()));
        let seen = Mutex::new(Vec::new());
        let handler = FnEventHandler::new(|event| {
            let label = match event {
                SummaryEvent::Paginated { round, pages, .. } => format!("paginated {round} {pages}"),
                SummaryEvent::PageSummarized { page, .. } => format!("page {page}"),
                SummaryEvent::SingleShot { round, .. } => format!("single {round}"),
                SummaryEvent::Finished { rounds, model_calls } => {
                    format!("finished {rounds} {model_calls}")
                }
                _ => return,
            };
            seen.lock().unwrap().push(label);
        });
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default())
            .with_event_handler(&handler);

        summarizer
            .summarize(&words(20_000), "llama3", 8_000)
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "paginated 1 4",
                "page 0",
                "page 1",
                "page 2",
                "page 3",
                "single 1",
                "finished 1 5",
            ]
        );
    }

    /// Answers with the page's first word after a delay that is longest for
    /// the earliest pages, so completions arrive out of order.
    struct StaggeredClient;

    impl LanguageModelClient for StaggeredClient {
        fn chat<'a>(&'a self, _model: &'a str, prompt: &'a str, _ctx: usize) -> ChatFuture<'a> {
            Box::pin(async move {
                let body = prompt.strip_prefix(SUMMARY_PROMPT_PREFIX).unwrap_or(prompt);
                let first = body.split_whitespace().next().unwrap_or("").to_string();
                let n: u64 = first.trim_start_matches('w').parse().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(n))).await;
                Ok(first)
            })
        }
    }

    struct OrderRecordingClient {
        final_prompt: Mutex<Option<String>>,
    }

    impl LanguageModelClient for OrderRecordingClient {
        fn chat<'a>(&'a self, model: &'a str, prompt: &'a str, ctx: usize) -> ChatFuture<'a> {
            Box::pin(async move {
                let reply = StaggeredClient.chat(model, prompt, ctx).await?;
                *self.final_prompt.lock().unwrap() = Some(prompt.to_string());
                Ok(reply)
            })
        }
    }

    #[tokio::test]
    async fn concurrent_replies_joined_in_page_order() {
        let client = OrderRecordingClient {
            final_prompt: Mutex::new(None),
        };
        let config = SummarizerConfig::default()
            .with_reply_reserve(8)
            .with_page_concurrency(4);
        let summarizer = RecursiveSummarizer::new(&client, config);
        let model = ModelProfile::new("tiny", 20).unwrap();

        summarizer
            .run(&SummarizationRequest::new(words(30), model, 20).with_reply_reserve(8))
            .await
            .unwrap();

        assert_eq!(
            client.final_prompt.lock().unwrap().as_deref(),
            Some("Summarise the following text: w0 w9 w18 w27")
        );
    }

    struct HangingClient;

    impl LanguageModelClient for HangingClient {
        fn chat<'a>(&'a self, _model: &'a str, _prompt: &'a str, _ctx: usize) -> ChatFuture<'a> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            })
        }
    }

    #[tokio::test]
    async fn call_timeout_surfaces_as_model_error() {
        let config = SummarizerConfig::default().with_call_timeout(Duration::from_millis(20));
        let summarizer = RecursiveSummarizer::new(&HangingClient, config);

        let err = summarizer.summarize("hello there", "llama3", 8_000).await.unwrap_err();

        assert_eq!(
            err,
            SummarizeError::LanguageModel(LanguageModelError::Timeout(Duration::from_millis(20)))
        );
    }

    /// Counts every word as exactly one token.
    struct OneTokenPerWord;

    impl TokenEstimator for OneTokenPerWord {
        fn estimate(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }

        fn words_within(&self, budget: usize) -> usize {
            budget
        }
    }

    #[tokio::test]
    async fn custom_estimator_drives_pagination() {
        let client = ScriptedClient::new(|_, _| Ok("ok".into()));
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default())
            .with_estimator(&OneTokenPerWord);

        // 7000 words would be ~9334 tokens by the word ratio, but fit here.
        summarizer.summarize(&words(7_000), "llama3", 8_000).await.unwrap();
        assert_eq!(client.call_count(), 1);

        summarizer.summarize(&words(10_000), "llama3", 8_000).await.unwrap();
        let prompts = client.prompts();
        assert_eq!(prompts.len(), 4);
        assert_eq!(page_word_counts(&prompts[1..3]), vec![7_400, 2_600]);
        assert_eq!(prompts[3], "Summarise the following text: ok ok");
    }

    #[tokio::test]
    async fn largest_context_does_not_overflow() {
        let client = ScriptedClient::new(|_, _| Ok("fine".into()));
        let registry =
            ModelRegistry::default().with_profile(ModelProfile::new("big", usize::MAX).unwrap());
        let summarizer = RecursiveSummarizer::new(&client, SummarizerConfig::default())
            .with_registry(registry);

        let summary = summarizer
            .summarize("hello world", "big", usize::MAX)
            .await
            .unwrap();
        assert_eq!(summary, "fine");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn request_uses_configured_reply_reserve() {
        let client = ScriptedClient::new(|_, _| Ok("unused".into()));
        let summarizer = RecursiveSummarizer::new(
            &client,
            SummarizerConfig::default().with_reply_reserve(7_999),
        );

        let request = summarizer.request(words(10), llama3(), 8_000);
        assert_eq!(request.reply_reserve, 7_999);

        let err = summarizer.run(&request).await.unwrap_err();
        assert_eq!(
            err,
            SummarizeError::Config(ConfigError::NoRoomForInput { page_size: 1 })
        );
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn words_per_page_from_budget() {
        let request = SummarizationRequest::new("", llama3(), 8_000);
        assert_eq!(request.words_per_page(&WordRatioEstimator), Ok(5_550));

        let request = SummarizationRequest::new("", llama3(), 8_000).with_reply_reserve(7_999);
        assert_eq!(
            request.words_per_page(&WordRatioEstimator),
            Err(ConfigError::NoRoomForInput { page_size: 1 })
        );
    }
}
