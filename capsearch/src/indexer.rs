//! Shared trie store and the caption indexer
//!
//! `IndexStore` owns both tries behind reader-writer locks. Writers take the
//! lock per line, so a long document becomes visible to queries line by line.
//! `Indexer` filters, tokenizes and inserts one document's lines.

use crate::interface::{
    CapSearchError, IndexFailure, IndexOutcome, IndexStats, IndexedDocument, Variant,
};
use crate::line_filter::{BlockState, CaptionLineFilter, LineFilter};
use crate::tokenize::{phrase_tokens, truncate_at_word, word_tokens};
use crate::trie::{CharTrie, TokenTrie};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Process-wide index state, shared by `Arc` between indexers and queries
#[derive(Debug, Default)]
pub struct IndexStore {
    tokens: RwLock<TokenTrie>,
    chars: RwLock<CharTrie>,
    documents: RwLock<HashSet<String>>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert one line's tokens as a single phrase.
    pub fn insert_phrase<S: AsRef<str>>(&self, tokens: &[S], doc_id: &str) {
        if tokens.is_empty() {
            return;
        }
        self.tokens.write().insert(tokens, doc_id);
    }

    /// Insert each word into the character trie.
    pub fn insert_words<S: AsRef<str>>(&self, words: &[S], doc_id: &str) {
        if words.is_empty() {
            return;
        }
        let mut trie = self.chars.write();
        for word in words {
            trie.insert(word.as_ref(), doc_id);
        }
    }

    pub(crate) fn record_document(&self, doc_id: &str) {
        let mut documents = self.documents.write();
        if !documents.contains(doc_id) {
            documents.insert(doc_id.to_owned());
        }
    }

    pub fn token_trie(&self) -> RwLockReadGuard<'_, TokenTrie> {
        self.tokens.read()
    }

    pub fn char_trie(&self) -> RwLockReadGuard<'_, CharTrie> {
        self.chars.read()
    }

    /// Counters read one lock at a time; not a consistent snapshot under writes.
    pub fn stats(&self) -> IndexStats {
        let documents = self.documents.read().len() as u64;
        let token_nodes = self.tokens.read().node_count() as u64;
        let char_nodes = self.chars.read().node_count() as u64;
        IndexStats {
            documents,
            token_nodes,
            char_nodes,
        }
    }

    /// Swap in empty roots for both tries at once.
    ///
    /// Lock order: documents, tokens, chars.
    pub fn clear(&self) {
        let mut documents = self.documents.write();
        let mut tokens = self.tokens.write();
        let mut chars = self.chars.write();
        *tokens = TokenTrie::new();
        *chars = CharTrie::new();
        documents.clear();
    }
}

/// Turns a document's lines into trie insertions
pub struct Indexer {
    store: Arc<IndexStore>,
    filter: Arc<dyn LineFilter>,
    max_line_chars: usize,
}

impl Indexer {
    /// Indexer using the caption line filter and no line length cap
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self::with_filter(store, Arc::new(CaptionLineFilter))
    }

    pub fn with_filter(store: Arc<IndexStore>, filter: Arc<dyn LineFilter>) -> Self {
        Self {
            store,
            filter,
            max_line_chars: 0,
        }
    }

    /// Truncate lines longer than `max_chars` before tokenizing (`0` = off)
    pub fn with_max_line_chars(mut self, max_chars: usize) -> Self {
        self.max_line_chars = max_chars;
        self
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Index `lines` under `doc_id`.
    ///
    /// Lines rejected by the filter are never tokenized. If nothing survives,
    /// the store is left untouched and the outcome is `NoIndexableContent`.
    pub fn index<I, S>(&self, doc_id: &str, lines: I, variant: Variant) -> IndexOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.index_stream(doc_id, lines.into_iter().map(Ok::<S, CapSearchError>), variant)
    }

    /// Index a fallible line stream under `doc_id`.
    ///
    /// The first `Err` stops indexing with a `RetrievalFailure` outcome. Lines
    /// inserted before it are kept, not rolled back.
    pub fn index_stream<I, S>(&self, doc_id: &str, lines: I, variant: Variant) -> IndexOutcome
    where
        I: IntoIterator<Item = Result<S, CapSearchError>>,
        S: AsRef<str>,
    {
        let mut indexed_lines = 0u64;
        let mut phrase_count = 0u64;
        let mut word_count = 0u64;
        let mut block = BlockState::default();

        for raw in lines {
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    if indexed_lines > 0 {
                        self.store.record_document(doc_id);
                    }
                    warn!(doc_id, lines = indexed_lines, error = %e, "source failed mid-document");
                    return IndexFailure::RetrievalFailure(e.into_retrieval_reason()).into();
                }
            };
            let raw = raw.as_ref();
            if !self.filter.accepts_in_block(raw, &mut block) {
                continue;
            }
            let normalized = self.filter.normalize(raw);
            let text = truncate_at_word(&normalized, self.max_line_chars);

            let mut produced = false;
            if variant.uses_token_trie() {
                let tokens = phrase_tokens(text);
                if !tokens.is_empty() {
                    self.store.insert_phrase(&tokens, doc_id);
                    phrase_count += tokens.len() as u64;
                    produced = true;
                }
            }
            if variant.uses_char_trie() {
                let words = word_tokens(text);
                if !words.is_empty() {
                    self.store.insert_words(&words, doc_id);
                    word_count += words.len() as u64;
                    produced = true;
                }
            }
            if produced {
                indexed_lines += 1;
            }
        }

        if indexed_lines == 0 {
            warn!(doc_id, %variant, "no indexable lines");
            return IndexFailure::NoIndexableContent.into();
        }

        self.store.record_document(doc_id);
        debug!(
            doc_id,
            %variant,
            lines = indexed_lines,
            phrase_tokens = phrase_count,
            words = word_count,
            "document indexed"
        );

        IndexOutcome::Indexed(IndexedDocument {
            doc_id: doc_id.to_owned(),
            variant,
            lines: indexed_lines,
            phrase_tokens: phrase_count,
            words: word_count,
        })
    }
}
