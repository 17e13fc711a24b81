//! Progress events emitted by the [`RecursiveSummarizer`](super::RecursiveSummarizer).
//!
//! The summarizer never logs on its own. Callers pass an [`EventHandler`]
//! to observe rounds and page calls, for logging, progress bars, or tests.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |

use tracing::{debug, info, warn};

/// Events emitted during one summarization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryEvent<'a> {
    /// The current text was measured against the context size.
    Estimated {
        round: u32,
        words: usize,
        estimated_tokens: usize,
        context_tokens: usize,
    },
    /// The text did not fit and was split into pages.
    Paginated {
        round: u32,
        pages: usize,
        words_per_page: usize,
    },
    /// One page was summarized.
    PageSummarized {
        round: u32,
        page: usize,
        pages: usize,
        reply: &'a str,
    },
    /// Page summaries were joined into the next round's input.
    Reduced {
        round: u32,
        words_before: usize,
        words_after: usize,
    },
    /// The text fit and is being summarized in one call.
    SingleShot { round: u32, words: usize },
    /// The run finished with a summary.
    Finished { rounds: u32, model_calls: usize },
}

/// Observer for [`SummaryEvent`]s.
///
/// # Example
///
/// ```ignore
/// struct PageCounter(AtomicUsize);
///
/// impl EventHandler for PageCounter {
///     fn on_event(&self, event: &SummaryEvent<'_>) {
///         if let SummaryEvent::PageSummarized { .. } = event {
///             self.0.fetch_add(1, Ordering::Relaxed);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &SummaryEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let SummaryEvent::Paginated { pages, .. } = event {
///         eprintln!("{pages} pages");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&SummaryEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&SummaryEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&SummaryEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &SummaryEvent<'_>) {
        (self.0)(event)
    }
}

/// Logs events through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &SummaryEvent<'_>) {
        match event {
            SummaryEvent::Estimated {
                round,
                words,
                estimated_tokens,
                context_tokens,
            } => {
                debug!(
                    "[round {round}] {words} words, ~{estimated_tokens} tokens (context {context_tokens})"
                );
            }
            SummaryEvent::Paginated {
                round,
                pages,
                words_per_page,
            } => {
                info!(
                    "[round {round}] text exceeds context size, divided into {pages} pages of up to {words_per_page} words"
                );
            }
            SummaryEvent::PageSummarized {
                round,
                page,
                pages,
                reply,
            } => {
                debug!(
                    "[round {round}] page {}/{pages} summarized ({} words)",
                    page + 1,
                    reply.split_whitespace().count()
                );
            }
            SummaryEvent::Reduced {
                round,
                words_before,
                words_after,
            } => {
                if words_after >= words_before {
                    warn!(
                        "[round {round}] page summaries did not shrink the text ({words_before} -> {words_after} words)"
                    );
                } else {
                    info!("[round {round}] reduced {words_before} -> {words_after} words");
                }
            }
            SummaryEvent::SingleShot { round, words } => {
                info!("[round {round}] summarizing {words} words in a single call");
            }
            SummaryEvent::Finished {
                rounds,
                model_calls,
            } => {
                info!("Summary finished after {rounds} reduction round(s), {model_calls} model call(s)");
            }
        }
    }
}
