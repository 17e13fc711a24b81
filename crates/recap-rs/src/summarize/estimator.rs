//! Token estimation without calling the model.
//!
//! The summarizer only needs two answers: how many tokens a text will cost,
//! and how many words fit in a given token budget. [`TokenEstimator`] keeps
//! those behind a trait so an exact per-model tokenizer can replace the
//! default heuristic without touching pagination.

/// Tokens per word numerator (common tokenizers average ~1.33 tokens/word).
pub const TOKENS_PER_WORD_NUM: usize = 4;
/// Tokens per word denominator.
pub const TOKENS_PER_WORD_DEN: usize = 3;

/// Approximates the number of model tokens a text consumes.
///
/// Implementations must be pure and must never invoke the model.
pub trait TokenEstimator: Send + Sync {
    /// Estimated token count of `text`.
    fn estimate(&self, text: &str) -> usize;

    /// The largest number of words whose estimate stays within `budget` tokens.
    fn words_within(&self, budget: usize) -> usize;
}

/// Word-count heuristic: `words * 4 / 3` tokens, rounded up.
///
/// Depends on the number of whitespace-delimited words only, so two texts
/// with the same word count always estimate the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordRatioEstimator;

impl WordRatioEstimator {
    /// Estimate from a pre-computed word count. Saturates at `usize::MAX`.
    pub fn tokens_for_words(words: usize) -> usize {
        // ceil(4w / 3) == w + ceil(w / 3)
        words.saturating_add(words.div_ceil(TOKENS_PER_WORD_DEN))
    }
}

impl TokenEstimator for WordRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        Self::tokens_for_words(text.split_whitespace().count())
    }

    fn words_within(&self, budget: usize) -> usize {
        // floor(3b / 4) without forming 3b.
        budget / TOKENS_PER_WORD_NUM * TOKENS_PER_WORD_DEN
            + budget % TOKENS_PER_WORD_NUM * TOKENS_PER_WORD_DEN / TOKENS_PER_WORD_NUM
    }
}
