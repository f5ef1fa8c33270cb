//! # Corpus Embedding Cache
//!
//! Read-through caches for embedded phrase sets. Embedding the whole canned
//! corpus on every request is the dominant cost of the canned matching
//! stage, so the pipeline computes it once and reuses it until a new
//! knowledge entry invalidates it.

use crate::providers::db::storage::CorpusEntry;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A deduplicated corpus with one embedding per entry, index-aligned.
#[derive(Debug)]
pub struct EmbeddedCorpus {
    pub entries: Vec<CorpusEntry>,
    pub vectors: Vec<Vec<f32>>,
}

/// Shared, invalidatable cache of an [`EmbeddedCorpus`].
///
/// Cloning shares the underlying cache. Concurrent fills are harmless: both
/// writers store equivalent data and the last one wins.
#[derive(Clone, Debug, Default)]
pub struct CorpusCache {
    inner: Arc<RwLock<Option<Arc<EmbeddedCorpus>>>>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached corpus, if one is present.
    pub async fn get(&self) -> Option<Arc<EmbeddedCorpus>> {
        self.inner.read().await.clone()
    }

    /// Stores a freshly embedded corpus and returns the shared handle.
    pub async fn store(&self, corpus: EmbeddedCorpus) -> Arc<EmbeddedCorpus> {
        let corpus = Arc::new(corpus);
        *self.inner.write().await = Some(corpus.clone());
        corpus
    }

    /// Drops the cached corpus so the next read re-fetches and re-embeds.
    pub async fn invalidate(&self) {
        debug!("Invalidating corpus embedding cache");
        *self.inner.write().await = None;
    }
}

/// Cache of embeddings for a fixed phrase list (the name-question corpus).
/// The phrases never change at runtime, so there is no invalidation.
#[derive(Clone, Debug, Default)]
pub struct PhraseVectorCache {
    inner: Arc<RwLock<Option<Arc<Vec<Vec<f32>>>>>>,
}

impl PhraseVectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<Vec<Vec<f32>>>> {
        self.inner.read().await.clone()
    }

    pub async fn store(&self, vectors: Vec<Vec<f32>>) -> Arc<Vec<Vec<f32>>> {
        let vectors = Arc::new(vectors);
        *self.inner.write().await = Some(vectors.clone());
        vectors
    }
}
