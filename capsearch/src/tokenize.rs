//! Tokenization for indexing and queries
//!
//! Phrase tokens are lower-cased whitespace-separated chunks, punctuation kept.
//! Word tokens are lower-cased maximal runs of word characters (`\w`), with
//! punctuation discarded.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Lower-case and split on whitespace.
pub fn phrase_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Lower-case and extract runs of word characters.
pub fn word_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lower)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Cut `text` to at most `max_chars` characters without splitting a word.
///
/// The cut falls on the last whitespace at or before the cap. A line whose
/// first word alone exceeds the cap yields `""`. `0` means unlimited.
pub(crate) fn truncate_at_word(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    let Some((cap, next)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    if next.is_whitespace() {
        return &text[..cap];
    }
    match text[..cap].rfind(char::is_whitespace) {
        Some(idx) => &text[..idx],
        None => "",
    }
}
