//! CaptionIndex - Main API for the service layer
//!
//! Architecture: one shared `IndexStore` holding a token trie (phrase queries)
//! and a character trie (intersection queries).
//!
//! Concurrency Model:
//! - Queries take read locks and run on the caller's thread
//! - Indexing runs on tokio spawn_blocking threads
//! - Uses global FALLBACK_RUNTIME when called outside any runtime
//! - Batch indexing fans out over Rayon

use crate::config::IndexConfig;
use crate::indexer::{IndexStore, Indexer};
use crate::interface::{
    CapSearchError, CaptionIndexApi, DocIds, Health, IndexFailure, IndexOutcome, IndexStats,
    LineStream, Variant,
};
use crate::query::QueryEngine;
use crate::source::CaptionSource;
use crate::upload::StagedUpload;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Global fallback Tokio runtime for when async functions are called outside any runtime context.
/// This is shared across all CaptionIndex instances and never dropped.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("capsearch-fallback")
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// Dedicated Rayon pool for batch indexing, when a thread count is configured
fn build_batch_pool(threads: usize) -> Option<Arc<rayon::ThreadPool>> {
    if threads == 0 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("capsearch-batch-{}", i))
        .build()
    {
        Ok(pool) => Some(Arc::new(pool)),
        Err(e) => {
            warn!(threads, error = %e, "batch pool unavailable, using global rayon pool");
            None
        }
    }
}

/// Thread-safe caption index: indexer and query engine over one shared store
pub struct CaptionIndex {
    store: Arc<IndexStore>,
    indexer: Arc<Indexer>,
    queries: QueryEngine,
    config: IndexConfig,
    batch_pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for CaptionIndex {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl CaptionIndex {
    /// Create an index with a fresh store
    pub fn new(config: IndexConfig) -> Self {
        Self::with_store(IndexStore::shared(), config)
    }

    /// Create an index over an existing shared store
    pub fn with_store(store: Arc<IndexStore>, config: IndexConfig) -> Self {
        let indexer = Indexer::with_filter(Arc::clone(&store), config.line_filter())
            .with_max_line_chars(config.max_line_chars);
        Self {
            queries: QueryEngine::new(Arc::clone(&store)),
            indexer: Arc::new(indexer),
            batch_pool: build_batch_pool(config.batch_threads),
            store,
            config,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
    fn runtime_handle(&self) -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }

    /// Fetch captions from `source` and index them with the configured default variant.
    /// A retrieval failure becomes a failed outcome; the store is not touched.
    pub async fn index_from_source(
        &self,
        source: &dyn CaptionSource,
        locator: &str,
    ) -> Result<IndexOutcome, CapSearchError> {
        match source.fetch(locator).await {
            Ok(captions) => {
                self.index(captions.video_id, captions.lines, self.config.default_variant)
                    .await
            }
            Err(e) => {
                warn!(locator, error = %e, "caption retrieval failed");
                Ok(IndexFailure::RetrievalFailure(e.into_retrieval_reason()).into())
            }
        }
    }

    /// Index a validated upload with the configured default variant
    pub async fn index_upload(&self, upload: StagedUpload) -> Result<IndexOutcome, CapSearchError> {
        debug!(doc_id = upload.doc_id(), filename = upload.filename(), "indexing upload");
        let (doc_id, lines) = upload.into_parts();
        self.index(doc_id, lines, self.config.default_variant).await
    }

    /// Index many documents in parallel. Outcomes are returned in input order.
    pub fn index_batch(&self, docs: Vec<(String, Vec<String>)>, variant: Variant) -> Vec<IndexOutcome> {
        let count = docs.len();
        let run = || -> Vec<IndexOutcome> {
            use rayon::prelude::*;
            docs.into_par_iter()
                .map(|(doc_id, lines)| self.indexer.index(&doc_id, lines, variant))
                .collect()
        };
        let outcomes = match &self.batch_pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        let indexed = outcomes.iter().filter(|o| o.is_success()).count();
        info!(documents = count, indexed, %variant, "batch indexed");
        outcomes
    }

    pub fn stats(&self) -> IndexStats {
        self.store.stats()
    }

    /// Drop all indexed content
    pub fn clear(&self) {
        self.store.clear();
        info!("index cleared");
    }
}

#[async_trait::async_trait]
impl CaptionIndexApi for CaptionIndex {
    /// Index a document's lines off the async executor
    async fn index(
        &self,
        doc_id: String,
        lines: LineStream,
        variant: Variant,
    ) -> Result<IndexOutcome, CapSearchError> {
        let indexer = Arc::clone(&self.indexer);
        let handle = self
            .runtime_handle()
            .spawn_blocking(move || indexer.index_stream(&doc_id, lines, variant));

        match handle.await {
            Ok(outcome) => {
                match &outcome {
                    IndexOutcome::Indexed(doc) => {
                        info!(doc_id = %doc.doc_id, lines = doc.lines, "document indexed")
                    }
                    IndexOutcome::Failed { failure } => info!(%failure, "document not indexed"),
                }
                Ok(outcome)
            }
            Err(_join_error) => {
                // JoinError means the task panicked or was aborted
                Err(CapSearchError::Cancelled)
            }
        }
    }

    fn query_phrase(&self, phrase: &str) -> DocIds {
        self.queries.query_phrase(phrase)
    }

    fn query_intersection(&self, phrase: &str) -> DocIds {
        self.queries.query_intersection(phrase)
    }

    fn health(&self) -> Health {
        Health::Ok
    }
}
