//! Token and character tries for caption lookup
//!
//! `TokenTrie` keys one edge per whole token and records document ids only at
//! terminal nodes, so a lookup matches an exact inserted sequence.
//! `CharTrie` keys one edge per character and records the document id at every
//! node along the word, so a lookup on any prefix returns every contributing
//! document.
//!
//! Both tries are append-only. Lookups hand back owned copies of the id sets.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// A node exclusively owned by its parent (or by the trie, for the root).
#[derive(Debug)]
pub(crate) struct TrieNode<K> {
    children: HashMap<K, TrieNode<K>>,
    doc_ids: HashSet<String>,
    /// End of an inserted token sequence; only `TokenTrie` sets or reads it.
    is_end: bool,
}

impl<K> Default for TrieNode<K> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            doc_ids: HashSet::new(),
            is_end: false,
        }
    }
}

impl<K: Eq + Hash> TrieNode<K> {
    fn child_or_insert(&mut self, key: K) -> &mut TrieNode<K> {
        self.children.entry(key).or_default()
    }

    fn add_doc(&mut self, doc_id: &str) {
        if !self.doc_ids.contains(doc_id) {
            self.doc_ids.insert(doc_id.to_owned());
        }
    }

    fn doc_set(&self) -> BTreeSet<String> {
        self.doc_ids.iter().cloned().collect()
    }

    /// Count of nodes in this subtree, including `self`.
    fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.values());
        }
        count
    }
}

/// Trie keyed on whole tokens; answers exact phrase lookups.
#[derive(Debug, Default)]
pub struct TokenTrie {
    root: TrieNode<String>,
}

impl TokenTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token sequence for `doc_id`. An empty sequence is a no-op.
    pub fn insert<S: AsRef<str>>(&mut self, tokens: &[S], doc_id: &str) {
        if tokens.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for token in tokens {
            node = node.child_or_insert(token.as_ref().to_owned());
        }
        node.is_end = true;
        node.add_doc(doc_id);
    }

    /// Documents that contained exactly `tokens` as one inserted sequence.
    ///
    /// Stops at the first missing token. A path that only exists as the
    /// prefix of a longer sequence is not a match.
    pub fn search<S: AsRef<str>>(&self, tokens: &[S]) -> BTreeSet<String> {
        if tokens.is_empty() {
            return BTreeSet::new();
        }
        let mut node = &self.root;
        for token in tokens {
            match node.children.get(token.as_ref()) {
                Some(child) => node = child,
                None => return BTreeSet::new(),
            }
        }
        if node.is_end {
            node.doc_set()
        } else {
            BTreeSet::new()
        }
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        self.root.subtree_len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

/// Trie keyed on the characters of single words; every node on a word's path
/// accumulates the document id.
#[derive(Debug, Default)]
pub struct CharTrie {
    root: TrieNode<char>,
}

impl CharTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `word` for `doc_id`. The root never records ids, so an empty
    /// word changes nothing.
    pub fn insert(&mut self, word: &str, doc_id: &str) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.child_or_insert(ch);
            node.add_doc(doc_id);
        }
    }

    /// Documents containing any word that starts with `word`.
    pub fn search(&self, word: &str) -> BTreeSet<String> {
        if word.is_empty() {
            return BTreeSet::new();
        }
        let mut node = &self.root;
        for ch in word.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return BTreeSet::new(),
            }
        }
        node.doc_set()
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        self.root.subtree_len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}
