//! Context-bounded summarization of arbitrarily long text.
//!
//! 1. **[`estimator`]**: [`TokenEstimator`] approximates token cost from word
//!    counts (`words * 4 / 3`) without calling the model.
//!
//! 2. **[`pages`]**: splits a word sequence into word-aligned [`Page`]s.
//!
//! 3. **[`summarizer`]**: [`RecursiveSummarizer`] summarizes page by page and
//!    reduces the joined page summaries until the text fits one call.
//!
//! 4. **[`events`]**: progress observer passed into the summarizer.

pub mod estimator;
pub mod events;
pub mod pages;
pub mod summarizer;

pub use estimator::{TokenEstimator, WordRatioEstimator};
pub use events::{EventHandler, FnEventHandler, LoggingHandler, NoopHandler, SummaryEvent};
pub use pages::{Page, paginate};
pub use summarizer::{
    DEFAULT_MAX_ROUNDS, DEFAULT_REPLY_RESERVE, RecursiveSummarizer, SUMMARY_PROMPT_PREFIX,
    SummarizationRequest, Summary, SummarizerConfig,
};
