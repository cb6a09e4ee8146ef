//! Line filtering for caption sources
//!
//! Caption files interleave spoken text with cue numbers, timing lines and
//! header metadata. A [`LineFilter`] decides which raw lines carry text and may
//! normalize the ones it keeps before tokenization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// WebVTT blocks that never carry cue text: the file header and NOTE, STYLE
/// and REGION blocks. Keywords are case-sensitive and only count at the start
/// of a block.
static NON_CUE_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:WEBVTT|NOTE|STYLE|REGION)(?:[ \t]|$)").unwrap());

/// Inline cue tags such as `<00:00:01.500>`, `<c>`, `</c>` or `<v Speaker>`.
static INLINE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Position within a document's blank-line separated blocks.
///
/// The indexer keeps one per document and threads it through
/// [`LineFilter::accepts_in_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockState {
    at_block_start: bool,
    skipping_block: bool,
}

impl Default for BlockState {
    fn default() -> Self {
        Self {
            at_block_start: true,
            skipping_block: false,
        }
    }
}

/// Decides which lines of a source are indexable text.
pub trait LineFilter: Send + Sync {
    /// Per-line rules: whether `line` should be tokenized at all.
    fn accepts(&self, line: &str) -> bool;

    /// Like `accepts`, for filters that also track block structure across the
    /// lines of one document.
    fn accepts_in_block(&self, line: &str, _block: &mut BlockState) -> bool {
        self.accepts(line)
    }

    /// Rewrite an accepted line before tokenization.
    fn normalize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(line)
    }
}

impl<F> LineFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accepts(&self, line: &str) -> bool {
        self(line)
    }
}

/// Filter for WebVTT/SRT caption files.
///
/// Per line, it skips blank lines, cue timing lines (`-->`) and lines that do
/// not start with a letter (cue numbers, bare timestamps, tag-led markup).
/// Across lines, it skips whole non-cue blocks: the `WEBVTT` header block with
/// its `Kind:`/`Language:` metadata, and `NOTE`, `STYLE` and `REGION` blocks up
/// to the next blank line. Inline cue tags are stripped from the lines it keeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionLineFilter;

impl LineFilter for CaptionLineFilter {
    fn accepts(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.contains("-->") {
            return false;
        }
        trimmed.starts_with(char::is_alphabetic)
    }

    fn accepts_in_block(&self, line: &str, block: &mut BlockState) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            *block = BlockState::default();
            return false;
        }
        let starts_block = std::mem::replace(&mut block.at_block_start, false);
        if starts_block && NON_CUE_BLOCK_REGEX.is_match(trimmed) {
            block.skipping_block = true;
        }
        !block.skipping_block && self.accepts(line)
    }

    fn normalize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        INLINE_TAG_REGEX.replace_all(line, " ")
    }
}

/// Accepts every line unchanged; for plain-text payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LineFilter for AcceptAll {
    fn accepts(&self, _line: &str) -> bool {
        true
    }
}
