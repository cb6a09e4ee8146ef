//! capsearch Service Interface Definition
//!
//! This file defines the types exchanged with the surrounding service layer
//! (HTTP transport, retrieval workers, upload staging).
//! It acts as the source of truth for shared types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A lazily produced sequence of source lines. An `Err` ends the document
/// early (a dropped connection, say); lines before it stay indexed.
pub type LineStream =
    Box<dyn Iterator<Item = Result<String, CapSearchError>> + Send + 'static>;

/// Set of matching document ids, owned by the caller.
pub type DocIds = BTreeSet<String>;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Which trie(s) an `index` call writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Whole-line phrases into the token trie (serves `query_phrase`)
    Tokens,
    /// Individual words into the character trie (serves `query_intersection`)
    Chars,
    /// Both tries in one pass over the lines
    #[default]
    Both,
}

impl Variant {
    pub fn uses_token_trie(self) -> bool {
        matches!(self, Variant::Tokens | Variant::Both)
    }

    pub fn uses_char_trie(self) -> bool {
        matches!(self, Variant::Chars | Variant::Both)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Tokens => "tokens",
            Variant::Chars => "chars",
            Variant::Both => "both",
        };
        f.write_str(name)
    }
}

impl FromStr for Variant {
    type Err = CapSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokens" | "token" | "phrase" => Ok(Variant::Tokens),
            "chars" | "char" | "words" => Ok(Variant::Chars),
            "both" => Ok(Variant::Both),
            other => Err(CapSearchError::InvalidInput(format!(
                "unknown index variant '{other}'"
            ))),
        }
    }
}

/// Liveness signal for the transport's health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Ok,
}

/// Why an index attempt produced nothing
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum IndexFailure {
    #[error("no indexable content")]
    NoIndexableContent,
    #[error("retrieval failed: {0}")]
    RetrievalFailure(String),
}

/// Result of one `index` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexOutcome {
    Indexed(IndexedDocument),
    Failed { failure: IndexFailure },
}

impl IndexOutcome {
    pub fn failed(failure: IndexFailure) -> Self {
        IndexOutcome::Failed { failure }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IndexOutcome::Indexed(_))
    }

    /// The document id, when indexing succeeded
    pub fn doc_id(&self) -> Option<&str> {
        match self {
            IndexOutcome::Indexed(doc) => Some(&doc.doc_id),
            IndexOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&IndexFailure> {
        match self {
            IndexOutcome::Indexed(_) => None,
            IndexOutcome::Failed { failure } => Some(failure),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// Summary of a successfully indexed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedDocument {
    pub doc_id: String,
    pub variant: Variant,
    /// Lines that survived filtering and produced at least one token
    pub lines: u64,
    /// Phrase tokens written to the token trie
    pub phrase_tokens: u64,
    /// Words written to the character trie
    pub words: u64,
}

/// Diagnostic counters for the shared store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IndexStats {
    /// Distinct document ids indexed successfully at least once
    pub documents: u64,
    pub token_nodes: u64,
    pub char_nodes: u64,
}

/// Captions handed over by a retrieval mechanism
pub struct RetrievedCaptions {
    pub video_id: String,
    pub lines: LineStream,
}

impl RetrievedCaptions {
    pub fn new(video_id: impl Into<String>, lines: LineStream) -> Self {
        Self {
            video_id: video_id.into(),
            lines,
        }
    }

    /// Captions from an in-memory text body, split into lines lazily.
    pub fn from_text(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(video_id, owned_lines(text.into()))
    }
}

/// Stream the lines of `text` (split like `str::lines`), taking ownership of
/// the body instead of copying it up front.
pub fn owned_lines(text: String) -> LineStream {
    Box::new(OwnedLines { text, pos: 0 })
}

struct OwnedLines {
    text: String,
    pos: usize,
}

impl Iterator for OwnedLines {
    type Item = Result<String, CapSearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let (line, advance) = match rest.find('\n') {
            Some(idx) => {
                let line = &rest[..idx];
                (line.strip_suffix('\r').unwrap_or(line), idx + 1)
            }
            None => (rest, rest.len()),
        };
        let line = line.to_owned();
        self.pos += advance;
        Some(Ok(line))
    }
}

impl fmt::Debug for RetrievedCaptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievedCaptions")
            .field("video_id", &self.video_id)
            .finish_non_exhaustive()
    }
}

/// Error type for capsearch boundary operations
#[derive(Debug, Error)]
pub enum CapSearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Retrieval error: {0}")]
    Retrieval(String),
    #[error("Operation cancelled")]
    Cancelled,
}

impl CapSearchError {
    /// Reason text for an `IndexFailure::RetrievalFailure`
    pub fn into_retrieval_reason(self) -> String {
        match self {
            CapSearchError::Retrieval(reason) => reason,
            other => other.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// The operations the service layer calls on the caption index.
/// This matches the functionality exposed by the `CaptionIndex` object.
#[async_trait::async_trait]
pub trait CaptionIndexApi: Send + Sync {
    /// Index `lines` under `doc_id`. Blank or markup-only sources yield
    /// `IndexOutcome::Failed` with `NoIndexableContent`, never an error.
    async fn index(
        &self,
        doc_id: String,
        lines: LineStream,
        variant: Variant,
    ) -> Result<IndexOutcome, CapSearchError>;

    /// Documents with a line exactly equal to `phrase` (case-insensitive).
    fn query_phrase(&self, phrase: &str) -> DocIds;

    /// Documents containing, for every word of `phrase`, some word with that prefix.
    fn query_intersection(&self, phrase: &str) -> DocIds;

    /// Trivial liveness signal.
    fn health(&self) -> Health;
}

impl From<IndexFailure> for IndexOutcome {
    fn from(failure: IndexFailure) -> Self {
        IndexOutcome::failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        assert_eq!("tokens".parse::<Variant>().unwrap(), Variant::Tokens);
        assert_eq!(" CHARS ".parse::<Variant>().unwrap(), Variant::Chars);
        assert_eq!("both".parse::<Variant>().unwrap(), Variant::Both);
        assert!(matches!(
            "trigram".parse::<Variant>(),
            Err(CapSearchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_variant_trie_selection() {
        assert!(Variant::Tokens.uses_token_trie() && !Variant::Tokens.uses_char_trie());
        assert!(!Variant::Chars.uses_token_trie() && Variant::Chars.uses_char_trie());
        assert!(Variant::Both.uses_token_trie() && Variant::Both.uses_char_trie());
    }

    #[test]
    fn test_outcome_json_shape() {
        let ok = IndexOutcome::Indexed(IndexedDocument {
            doc_id: "v1".into(),
            variant: Variant::Tokens,
            lines: 2,
            phrase_tokens: 5,
            words: 0,
        });
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "indexed");
        assert_eq!(json["doc_id"], "v1");
        assert_eq!(json["variant"], "tokens");

        let failed: IndexOutcome =
            IndexFailure::RetrievalFailure("No captions found".into()).into();
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["failure"]["kind"], "retrieval_failure");
        assert_eq!(json["failure"]["reason"], "No captions found");
    }

    #[test]
    fn test_retrieved_captions_from_text() {
        let captions = RetrievedCaptions::from_text("abc", "WEBVTT\n\nhello there\n");
        assert_eq!(captions.video_id, "abc");
        let lines: Vec<String> = captions.lines.map(Result::unwrap).collect();
        assert_eq!(lines, vec!["WEBVTT", "", "hello there"]);
    }

    #[test]
    fn test_owned_lines_matches_str_lines() {
        let texts = [
            "",
            "one",
            "one\ntwo",
            "one\r\ntwo\r\n",
            "\n\nafter blanks\n",
            "héllo\nwörld",
        ];
        for text in texts {
            let expected: Vec<&str> = text.lines().collect();
            let actual: Vec<String> = owned_lines(text.to_string())
                .map(Result::unwrap)
                .collect();
            assert_eq!(actual, expected, "splitting {:?}", text);
        }
    }

    #[test]
    fn test_retrieval_reason() {
        assert_eq!(
            CapSearchError::Retrieval("socket closed".into()).into_retrieval_reason(),
            "socket closed"
        );
        assert_eq!(
            CapSearchError::Cancelled.into_retrieval_reason(),
            "Operation cancelled"
        );
    }
}
