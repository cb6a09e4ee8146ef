//! Query engine for phrase and intersection lookups
//!
//! Both query modes lower-case and whitespace-split the input. A blank query
//! returns an empty set without touching the store.

use crate::indexer::IndexStore;
use crate::interface::DocIds;
use crate::tokenize::phrase_tokens;
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<IndexStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self { store }
    }

    /// Documents with a line whose tokens are exactly those of `phrase`.
    pub fn query_phrase(&self, phrase: &str) -> DocIds {
        let tokens = phrase_tokens(phrase);
        if tokens.is_empty() {
            return DocIds::new();
        }
        let matches = self.store.token_trie().search(&tokens);
        trace!(tokens = tokens.len(), result_count = matches.len(), "phrase query");
        matches
    }

    /// Intersection of the per-word prefix lookups for every word in `phrase`.
    ///
    /// The read lock is held across all words, so each word sees the same trie.
    pub fn query_intersection(&self, phrase: &str) -> DocIds {
        let words = phrase_tokens(phrase);
        let Some((first, rest)) = words.split_first() else {
            return DocIds::new();
        };

        let trie = self.store.char_trie();
        let mut matches = trie.search(first);
        for word in rest {
            if matches.is_empty() {
                break;
            }
            let word_matches = trie.search(word);
            matches.retain(|doc_id| word_matches.contains(doc_id));
        }
        drop(trie);

        trace!(words = words.len(), result_count = matches.len(), "intersection query");
        matches
    }
}
