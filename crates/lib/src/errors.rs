use crate::prompts;
use thiserror::Error;

/// Custom error types for the resolution engine.
///
/// `NoMatch` is deliberately absent: a miss at the canned or history stage is
/// an expected outcome that falls through to the next stage, not an error.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Embedding failed: {0}")]
    Encoding(String),
    #[error("Knowledge store is unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Generative fallback failed: {0}")]
    GenerationFailed(String),
    #[error("An AI provider is required to build the resolver")]
    MissingAiProvider,
    #[error("A knowledge store is required to build the resolver")]
    MissingKnowledgeStore,
    #[error("An embedding endpoint is required to build the resolver")]
    MissingEmbeddingConfig,
}

impl ResolveError {
    /// The single user-visible reply for this error kind.
    ///
    /// Internal detail stays in logs; callers at the pipeline boundary send
    /// exactly this text to the end user.
    pub fn user_reply(&self) -> &'static str {
        match self {
            ResolveError::Encoding(_) => prompts::ENCODING_FAILURE_REPLY,
            ResolveError::GenerationFailed(_) => prompts::GENERATION_FAILURE_REPLY,
            _ => prompts::STORE_FAILURE_REPLY,
        }
    }
}
