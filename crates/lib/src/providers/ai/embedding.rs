//! # Embeddings Provider
//!
//! Generates vector embeddings by calling an external, OpenAI-compatible
//! embeddings API. Every vector is re-normalized to unit length locally so
//! that a dot product equals cosine similarity, whatever the collaborator
//! returns.

use crate::{errors::ResolveError, similarity};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Serialize, Debug)]
struct BatchEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Generates a unit-normalized embedding for a single text input.
///
/// Fails with [`ResolveError::Encoding`] on empty input, a non-success
/// response, or a malformed body. Encoding failures are non-retryable for
/// the current request.
pub async fn generate_embedding(
    api_url: &str,
    model: &str,
    input: &str,
    api_key: Option<&str>,
) -> Result<Vec<f32>, ResolveError> {
    if input.trim().is_empty() {
        return Err(ResolveError::Encoding(
            "Cannot embed an empty input".to_string(),
        ));
    }

    let request_body = EmbeddingRequest { model, input };
    let vectors = send_embedding_request(api_url, api_key, &request_body, 1).await?;
    vectors
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::Encoding("Embeddings API returned no vectors".to_string()))
}

/// Generates unit-normalized embeddings for a batch of inputs, preserving
/// order. Used for corpus pre-computation.
pub async fn generate_embeddings(
    api_url: &str,
    model: &str,
    inputs: &[String],
    api_key: Option<&str>,
) -> Result<Vec<Vec<f32>>, ResolveError> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    if inputs.iter().any(|input| input.trim().is_empty()) {
        return Err(ResolveError::Encoding(
            "Cannot embed an empty input".to_string(),
        ));
    }

    let request_body = BatchEmbeddingRequest { model, input: inputs };
    send_embedding_request(api_url, api_key, &request_body, inputs.len()).await
}

async fn send_embedding_request<T: Serialize + std::fmt::Debug>(
    api_url: &str,
    api_key: Option<&str>,
    request_body: &T,
    expected: usize,
) -> Result<Vec<Vec<f32>>, ResolveError> {
    let client = ReqwestClient::new();
    debug!(payload = ?request_body, "--> Sending request to Embeddings API");

    let mut request_builder = client.post(api_url).json(request_body);
    if let Some(key) = api_key {
        request_builder = request_builder.bearer_auth(key);
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| ResolveError::Encoding(e.to_string()))?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ResolveError::Encoding(error_text));
    }

    let embedding_response: EmbeddingResponse = response
        .json()
        .await
        .map_err(|e| ResolveError::Encoding(e.to_string()))?;

    if embedding_response.data.len() != expected {
        return Err(ResolveError::Encoding(format!(
            "Embeddings API returned {} vectors for {expected} inputs",
            embedding_response.data.len()
        )));
    }

    embedding_response
        .data
        .into_iter()
        .map(|d| {
            similarity::normalize(d.embedding).ok_or_else(|| {
                ResolveError::Encoding("Embedding model returned a zero vector".to_string())
            })
        })
        .collect()
}
