use crate::corpus::{CorpusCache, PhraseVectorCache};
use crate::errors::ResolveError;
use crate::providers::{ai::AiProvider, db::storage::KnowledgeStore};
use crate::similarity::Thresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for the embedding collaborator.
#[derive(Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

/// Tunable policy for the resolution pipeline.
///
/// Every value here is configuration, never a constant at a call site: the
/// thresholds, the reply word bound, and the corpus category can all change
/// without touching code.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Word bound stated in the generation prompt to keep replies short.
    #[serde(default = "default_max_reply_words")]
    pub max_reply_words: usize,
    /// The corpus category the canned matching stage reads from and the
    /// fallback path writes new entries into.
    #[serde(default = "default_corpus_category")]
    pub corpus_category: String,
}

fn default_max_reply_words() -> usize {
    20
}

fn default_corpus_category() -> String {
    "greeting".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            max_reply_words: default_max_reply_words(),
            corpus_category: default_corpus_category(),
        }
    }
}

/// How the pipeline arrived at a reply.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A canned corpus entry matched above the canned threshold.
    Canned,
    /// A name question or self-introduction was handled directly.
    NameIntent,
    /// The exact utterance was answered before; the stored answer was reused.
    History,
    /// The generative fallback produced a new answer.
    Generated,
    /// The utterance was empty after normalization.
    Unrecognized,
}

/// The outcome of resolving one utterance.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Resolution {
    pub reply: String,
    pub source: ResolutionSource,
}

/// The resolution engine client.
///
/// Owns the provider seams (knowledge store, generative fallback, embedding
/// endpoint) and the corpus embedding caches shared across requests.
pub struct ResolverClient {
    pub(crate) store: Box<dyn KnowledgeStore>,
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) embedding: EmbeddingConfig,
    pub(crate) config: ResolverConfig,
    pub(crate) corpus_cache: CorpusCache,
    pub(crate) name_query_cache: PhraseVectorCache,
}

impl fmt::Debug for ResolverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverClient")
            .field("embedding", &self.embedding)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A builder for creating [`ResolverClient`] instances.
#[derive(Default)]
pub struct ResolverClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    store: Option<Box<dyn KnowledgeStore>>,
    embedding: Option<EmbeddingConfig>,
    config: ResolverConfig,
}

impl ResolverClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generative fallback provider.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the knowledge store.
    pub fn knowledge_store(mut self, store: Box<dyn KnowledgeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the embedding endpoint configuration.
    pub fn embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Overrides the default pipeline policy.
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the [`ResolverClient`], failing if a required collaborator
    /// was not provided.
    pub fn build(self) -> Result<ResolverClient, ResolveError> {
        Ok(ResolverClient {
            ai_provider: self.ai_provider.ok_or(ResolveError::MissingAiProvider)?,
            store: self.store.ok_or(ResolveError::MissingKnowledgeStore)?,
            embedding: self.embedding.ok_or(ResolveError::MissingEmbeddingConfig)?,
            config: self.config,
            corpus_cache: CorpusCache::new(),
            name_query_cache: PhraseVectorCache::new(),
        })
    }
}
