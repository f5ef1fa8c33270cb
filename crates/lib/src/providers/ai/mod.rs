pub mod embedding;
pub mod ollama;

use crate::errors::ResolveError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{generate_embedding, generate_embeddings};
use std::fmt::Debug;

/// A trait for the generative fallback collaborator.
///
/// This defines the single seam the pipeline needs from a text-generation
/// model: turn a prompt into a short reply. Implementations wrap concrete
/// endpoints (e.g. an Ollama server).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response for the given prompt.
    ///
    /// Any non-success from the underlying endpoint must surface as
    /// [`ResolveError::GenerationFailed`]; the pipeline never persists a
    /// reply it did not receive.
    async fn generate(&self, prompt: &str) -> Result<String, ResolveError>;
}

dyn_clone::clone_trait_object!(AiProvider);
