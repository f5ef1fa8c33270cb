use crate::{
    errors::ResolveError,
    providers::db::storage::{CorpusEntry, KnowledgeStore},
};
use async_trait::async_trait;
use chrono::Utc;
use std::fmt::{self, Debug};
use tracing::debug;
use turso::{params, Database, Value as TursoValue};

mod sql;

/// A knowledge store backed by a local SQLite database via Turso.
///
/// The provider holds a `Database` instance, which manages a connection
/// pool. When cloned, it shares the same underlying database, allowing
/// concurrent access to the same file or in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// Use ":memory:" for a unique, isolated in-memory database. To share
    /// an in-memory database across instances (e.g., in tests), create one
    /// provider and `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, ResolveError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(store_unavailable)?;

        // WAL keeps concurrent readers from blocking the single writer on
        // file-based databases; it is a no-op in memory.
        let conn = db.connect().map_err(store_unavailable)?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(store_unavailable)?;

        Ok(Self { db })
    }

    /// Ensures all required tables and indexes exist. Idempotent and safe
    /// to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), ResolveError> {
        let conn = self.db.connect().map_err(store_unavailable)?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(store_unavailable)?;
        }
        Ok(())
    }

    /// A helper for tests to pre-populate data by executing multiple SQL
    /// statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), ResolveError> {
        let conn = self.db.connect().map_err(store_unavailable)?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(store_unavailable)?;
        }
        Ok(())
    }

    fn connect(&self) -> Result<turso::Connection, ResolveError> {
        self.db.connect().map_err(store_unavailable)
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

fn store_unavailable(e: turso::Error) -> ResolveError {
    ResolveError::StoreUnavailable(e.to_string())
}

fn text_or_empty(value: TursoValue) -> String {
    match value {
        TursoValue::Text(s) => s,
        _ => String::new(),
    }
}

#[async_trait]
impl KnowledgeStore for SqliteProvider {
    async fn upsert_user(&self, uid: &str, name: Option<&str>) -> Result<(), ResolveError> {
        let conn = self.connect()?;
        match name {
            Some(name) => {
                conn.execute(
                    "INSERT INTO users (uid, name) VALUES (?, ?)
                     ON CONFLICT (uid) DO UPDATE SET name = excluded.name",
                    params![uid, name],
                )
                .await
                .map_err(store_unavailable)?;
            }
            // Without a name this is a pure existence merge; it must not
            // erase a name learned earlier.
            None => {
                conn.execute(
                    "INSERT INTO users (uid, name) VALUES (?, NULL)
                     ON CONFLICT (uid) DO NOTHING",
                    params![uid],
                )
                .await
                .map_err(store_unavailable)?;
            }
        }
        Ok(())
    }

    async fn get_user_name(&self, uid: &str) -> Result<Option<String>, ResolveError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query("SELECT name FROM users WHERE uid = ?", params![uid])
            .await
            .map_err(store_unavailable)?;

        match rows.next().await.map_err(store_unavailable)? {
            Some(row) => match row.get_value(0).map_err(store_unavailable)? {
                TursoValue::Text(name) if !name.is_empty() => Ok(Some(name)),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn fetch_corpus(&self, category: &str) -> Result<Vec<CorpusEntry>, ResolveError> {
        let conn = self.connect()?;
        // The UNIQUE (category, phrase) constraint keeps the corpus
        // deduplicated at write time; insertion order makes the result
        // stable across calls.
        let mut rows = conn
            .query(
                "SELECT phrase, reply FROM corpus WHERE category = ? ORDER BY id",
                params![category],
            )
            .await
            .map_err(store_unavailable)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(store_unavailable)? {
            entries.push(CorpusEntry {
                phrase: text_or_empty(row.get_value(0).map_err(store_unavailable)?),
                reply: text_or_empty(row.get_value(1).map_err(store_unavailable)?),
            });
        }

        debug!(category, entries = entries.len(), "Fetched canned corpus");
        Ok(entries)
    }

    async fn lookup_reply(
        &self,
        category: &str,
        phrase: &str,
    ) -> Result<Option<String>, ResolveError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT reply FROM corpus WHERE category = ? AND phrase = ?",
                params![category, phrase],
            )
            .await
            .map_err(store_unavailable)?;

        match rows.next().await.map_err(store_unavailable)? {
            Some(row) => Ok(Some(text_or_empty(
                row.get_value(0).map_err(store_unavailable)?,
            ))),
            None => Ok(None),
        }
    }

    async fn lookup_previous_answer(
        &self,
        question_text: &str,
    ) -> Result<Option<String>, ResolveError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT a.text FROM answers a
                 JOIN questions q ON a.question_id = q.id
                 WHERE q.text = ?
                 ORDER BY a.id DESC
                 LIMIT 1",
                params![question_text],
            )
            .await
            .map_err(store_unavailable)?;

        match rows.next().await.map_err(store_unavailable)? {
            Some(row) => Ok(Some(text_or_empty(
                row.get_value(0).map_err(store_unavailable)?,
            ))),
            None => Ok(None),
        }
    }

    async fn log_chat_turn(
        &self,
        uid: &str,
        message: &str,
        reply: &str,
        timestamp_ms: i64,
    ) -> Result<(), ResolveError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO chat_log (uid, message, reply, timestamp) VALUES (?, ?, ?, ?)",
            params![uid, message, reply, timestamp_ms],
        )
        .await
        .map_err(store_unavailable)?;
        Ok(())
    }

    async fn create_qa_pair(
        &self,
        uid: &str,
        question_text: &str,
        answer_text: &str,
    ) -> Result<(), ResolveError> {
        let conn = self.connect()?;
        let created_at = Utc::now().timestamp_millis();

        // The pair must land atomically; a question without its answer
        // would satisfy the history lookup with nothing to return.
        conn.execute("BEGIN TRANSACTION", ())
            .await
            .map_err(store_unavailable)?;

        let result = async {
            let mut rows = conn
                .query(
                    "INSERT INTO questions (uid, text, created_at) VALUES (?, ?, ?) RETURNING id",
                    params![uid, question_text, created_at],
                )
                .await
                .map_err(store_unavailable)?;

            let question_id = match rows.next().await.map_err(store_unavailable)? {
                Some(row) => match row.get_value(0).map_err(store_unavailable)? {
                    TursoValue::Integer(id) => id,
                    other => {
                        return Err(ResolveError::StoreUnavailable(format!(
                            "Unexpected question id value: {other:?}"
                        )))
                    }
                },
                None => {
                    return Err(ResolveError::StoreUnavailable(
                        "Question insert returned no id".to_string(),
                    ))
                }
            };

            conn.execute(
                "INSERT INTO answers (question_id, text, created_at) VALUES (?, ?, ?)",
                params![question_id, answer_text, created_at],
            )
            .await
            .map_err(store_unavailable)?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                conn.execute("COMMIT", ())
                    .await
                    .map_err(store_unavailable)?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    async fn create_knowledge_entry(
        &self,
        category: &str,
        phrase: &str,
        reply: &str,
    ) -> Result<bool, ResolveError> {
        let conn = self.connect()?;
        let affected = conn
            .execute(
                "INSERT INTO corpus (category, phrase, reply) VALUES (?, ?, ?)
                 ON CONFLICT (category, phrase) DO NOTHING",
                params![category, phrase, reply],
            )
            .await
            .map_err(store_unavailable)?;
        Ok(affected > 0)
    }
}
