#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared mocks for exercising the resolution pipeline without real
//! collaborators: a scripted AI provider, a store that always fails, and
//! helpers for mounting embedding responses on a wiremock server.

use async_trait::async_trait;
use mali::providers::ai::AiProvider;
use mali::providers::db::sqlite::SqliteProvider;
use mali::providers::db::storage::{CorpusEntry, KnowledgeStore};
use mali::ResolveError;
use serde_json::json;
use std::sync::{Arc, Once, RwLock};
use turso::Value as TursoValue;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The embedding model name used by every pipeline test.
pub const TEST_EMBEDDING_MODEL: &str = "multilingual-test";

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

// --- Mock AI Provider for Logic Testing ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<String>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ResolveError> {
        self.call_history
            .write()
            .unwrap()
            .push(prompt.to_string());

        if let Some(response) = self.responses.write().unwrap().pop() {
            Ok(response)
        } else {
            Ok("Default mock response".to_string())
        }
    }
}

/// An AI provider whose every call fails, for exercising the
/// generation-failure path.
#[derive(Clone, Debug)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ResolveError> {
        Err(ResolveError::GenerationFailed(
            "mock generation outage".to_string(),
        ))
    }
}

// --- Failing Knowledge Store for connectivity scenarios ---

#[derive(Clone, Debug)]
pub struct FailingStore;

fn unavailable() -> ResolveError {
    ResolveError::StoreUnavailable("mock connectivity failure".to_string())
}

#[async_trait]
impl KnowledgeStore for FailingStore {
    async fn upsert_user(&self, _uid: &str, _name: Option<&str>) -> Result<(), ResolveError> {
        Err(unavailable())
    }
    async fn get_user_name(&self, _uid: &str) -> Result<Option<String>, ResolveError> {
        Err(unavailable())
    }
    async fn fetch_corpus(&self, _category: &str) -> Result<Vec<CorpusEntry>, ResolveError> {
        Err(unavailable())
    }
    async fn lookup_reply(
        &self,
        _category: &str,
        _phrase: &str,
    ) -> Result<Option<String>, ResolveError> {
        Err(unavailable())
    }
    async fn lookup_previous_answer(
        &self,
        _question_text: &str,
    ) -> Result<Option<String>, ResolveError> {
        Err(unavailable())
    }
    async fn log_chat_turn(
        &self,
        _uid: &str,
        _message: &str,
        _reply: &str,
        _timestamp_ms: i64,
    ) -> Result<(), ResolveError> {
        Err(unavailable())
    }
    async fn create_qa_pair(
        &self,
        _uid: &str,
        _question_text: &str,
        _answer_text: &str,
    ) -> Result<(), ResolveError> {
        Err(unavailable())
    }
    async fn create_knowledge_entry(
        &self,
        _category: &str,
        _phrase: &str,
        _reply: &str,
    ) -> Result<bool, ResolveError> {
        Err(unavailable())
    }
}

// --- Wiremock helpers for the embeddings collaborator ---

/// Mounts a response for a single-text embedding request. The matcher is
/// exact so single and batch requests can never shadow one another.
pub async fn mock_embedding(server: &MockServer, text: &str, vector: &[f32]) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(
            json!({ "model": TEST_EMBEDDING_MODEL, "input": text }),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "embedding": vector }] })),
        )
        .mount(server)
        .await;
}

/// Mounts a response for a batch embedding request, one vector per input,
/// in order.
pub async fn mock_batch_embedding(server: &MockServer, texts: &[&str], vectors: &[&[f32]]) {
    let data: Vec<serde_json::Value> = vectors
        .iter()
        .map(|v| json!({ "embedding": v }))
        .collect();
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(
            json!({ "model": TEST_EMBEDDING_MODEL, "input": texts }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

/// The embedding endpoint URL for a mock server.
pub fn embeddings_url(server: &MockServer) -> String {
    format!("{}/embeddings", server.uri())
}

/// Counts the rows of a table in an in-memory test database.
pub async fn count_rows(provider: &SqliteProvider, table: &str) -> i64 {
    let conn = provider.db.connect().expect("test database is reachable");
    let mut rows = conn
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .expect("COUNT query succeeds");
    let row = rows
        .next()
        .await
        .expect("COUNT query yields rows")
        .expect("COUNT always returns a row");
    match row.get_value(0).expect("COUNT value is readable") {
        TursoValue::Integer(count) => count,
        other => panic!("Unexpected COUNT value: {other:?}"),
    }
}
