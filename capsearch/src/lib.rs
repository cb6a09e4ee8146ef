//! Capsearch - in-memory full-text index over video captions
//!
//! Two tries share one store:
//! - a token trie answering exact phrase queries, scoped to a single caption line
//! - a character trie answering prefix queries, intersected across query words
//!
//! Indexing filters caption markup (cue numbers, timing lines, headers) before
//! tokenizing. All state lives in memory behind reader-writer locks.

pub mod config;
pub mod indexer;
pub mod interface;
pub mod line_filter;
pub mod query;
pub mod source;
mod store;
pub mod tokenize;
pub mod tracing_setup;
pub mod trie;
pub mod upload;

pub use config::{ConfigError, IndexConfig};
pub use indexer::{IndexStore, Indexer};
pub use interface::*;
pub use line_filter::{AcceptAll, BlockState, CaptionLineFilter, LineFilter};
pub use query::QueryEngine;
pub use source::{CaptionSource, InMemorySource};
pub use store::CaptionIndex;
pub use trie::{CharTrie, TokenTrie};
pub use upload::StagedUpload;
