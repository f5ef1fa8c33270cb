//! # SQLite Specific SQL
//!
//! Centralizes the schema and query strings for the SQLite-backed knowledge
//! store. Every statement that touches user- or model-controlled text takes
//! it as a bound parameter.

/// Users, keyed by the messaging platform's opaque identifier.
pub const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        uid TEXT PRIMARY KEY,
        name TEXT
    );";

/// The canned corpus: canonical phrases and their fixed replies, grouped by
/// category. The unique constraint is what makes exact-duplicate knowledge
/// entries a no-op.
pub const CREATE_CORPUS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS corpus (
        id INTEGER PRIMARY KEY,
        category TEXT NOT NULL,
        phrase TEXT NOT NULL,
        reply TEXT NOT NULL,
        UNIQUE (category, phrase)
    );";

/// Previously asked questions, linked to the asking user.
pub const CREATE_QUESTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY,
        uid TEXT NOT NULL REFERENCES users (uid),
        text TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );";

/// Answers, each linked to exactly one question.
pub const CREATE_ANSWERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS answers (
        id INTEGER PRIMARY KEY,
        question_id INTEGER NOT NULL REFERENCES questions (id),
        text TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );";

/// The append-only chat log: one row per (message, reply) turn.
pub const CREATE_CHAT_LOG_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS chat_log (
        id INTEGER PRIMARY KEY,
        uid TEXT NOT NULL REFERENCES users (uid),
        message TEXT NOT NULL,
        reply TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    );";

/// Index backing the exact-text history lookup.
pub const CREATE_QUESTIONS_TEXT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_questions_text ON questions (text);";

/// All statements needed to bootstrap the schema, in dependency order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_CORPUS_TABLE,
    CREATE_QUESTIONS_TABLE,
    CREATE_ANSWERS_TABLE,
    CREATE_CHAT_LOG_TABLE,
    CREATE_QUESTIONS_TEXT_INDEX,
];
