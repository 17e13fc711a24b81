//! Word-aligned pagination of a text.

/// A contiguous run of words from one summarization round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// Zero-based position of the page within its round.
    pub index: usize,
    pub words: &'a [&'a str],
}

impl Page<'_> {
    /// The page's words joined with single spaces.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

/// Split `words` into consecutive pages of `words_per_page` words.
///
/// The last page may be shorter. Pages never overlap and cover every word
/// exactly once in the original order. `words_per_page` must be non-zero.
pub fn paginate<'a>(words: &'a [&'a str], words_per_page: usize) -> Vec<Page<'a>> {
    assert!(words_per_page > 0, "words_per_page must be at least 1");
    words
        .chunks(words_per_page)
        .enumerate()
        .map(|(index, words)| Page { index, words })
        .collect()
}
