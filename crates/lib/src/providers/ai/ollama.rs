use crate::{errors::ResolveError, providers::ai::AiProvider};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

// --- Ollama generate request and response structures ---

#[derive(Serialize, Debug)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

// --- Ollama Provider implementation ---

/// A provider for an Ollama-compatible `/api/generate` endpoint.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider` with a bounded request timeout.
    pub fn new(api_url: String, model: String, timeout: Duration) -> Result<Self, ResolveError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ResolveError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
        })
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ResolveError> {
        let request_body = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        debug!(model = %self.model, "--> Sending prompt to Ollama");

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ResolveError::GenerationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResolveError::GenerationFailed(format!(
                "Ollama returned {status}: {error_text}"
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ResolveError::GenerationFailed(e.to_string()))?;

        debug!("<-- Response from Ollama: {}", ollama_response.response);
        Ok(ollama_response.response)
    }
}
