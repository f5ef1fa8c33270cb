use crate::errors::ResolveError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// One canned corpus entry: a canonical phrase and its fixed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub phrase: String,
    pub reply: String,
}

/// A trait for the persistent knowledge store.
///
/// This is the engine's sole interface to the graph of users, canned
/// entries, logged questions/answers, and chat turns. Implementations must
/// issue every statement with bound parameters; user- and model-controlled
/// text never reaches a query string.
///
/// Any connectivity or IO failure maps to
/// [`ResolveError::StoreUnavailable`]. Writes are individually atomic: a
/// failed call leaves no partial chat turn or question/answer pair behind.
#[async_trait]
pub trait KnowledgeStore: Send + Sync + Debug + DynClone {
    /// Creates the user if absent, updating the display name when one is
    /// given. Idempotent on `uid`; passing `None` never erases a
    /// previously learned name.
    async fn upsert_user(&self, uid: &str, name: Option<&str>) -> Result<(), ResolveError>;

    /// Returns the user's stored display name, if any.
    async fn get_user_name(&self, uid: &str) -> Result<Option<String>, ResolveError>;

    /// Fetches the canned corpus for a category, deduplicated by phrase,
    /// in stable insertion order.
    async fn fetch_corpus(&self, category: &str) -> Result<Vec<CorpusEntry>, ResolveError>;

    /// Exact-match lookup of a canonical phrase's fixed reply.
    async fn lookup_reply(
        &self,
        category: &str,
        phrase: &str,
    ) -> Result<Option<String>, ResolveError>;

    /// Exact-match lookup of a previously logged question; returns the
    /// newest stored answer.
    async fn lookup_previous_answer(
        &self,
        question_text: &str,
    ) -> Result<Option<String>, ResolveError>;

    /// Appends one immutable chat turn for an existing user.
    async fn log_chat_turn(
        &self,
        uid: &str,
        message: &str,
        reply: &str,
        timestamp_ms: i64,
    ) -> Result<(), ResolveError>;

    /// Records a question and its answer as one atomic pair, linked to an
    /// existing user.
    async fn create_qa_pair(
        &self,
        uid: &str,
        question_text: &str,
        answer_text: &str,
    ) -> Result<(), ResolveError>;

    /// Adds a new canned entry so a generated answer can be reused.
    /// Returns `false` when an identical phrase already exists in the
    /// category and nothing was written.
    async fn create_knowledge_entry(
        &self,
        category: &str,
        phrase: &str,
        reply: &str,
    ) -> Result<bool, ResolveError>;
}

dyn_clone::clone_trait_object!(KnowledgeStore);
