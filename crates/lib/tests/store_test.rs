//! # Knowledge Store Tests
//!
//! Exercises the SQLite-backed store in isolation with in-memory databases:
//! upsert idempotence, corpus deduplication, exact-match lookups, and the
//! atomicity-visible effects of the pair write.

mod common;

use anyhow::Result;
use common::{count_rows, setup_tracing};
use mali::providers::db::sqlite::SqliteProvider;
use mali::providers::db::storage::KnowledgeStore;

async fn new_store() -> Result<SqliteProvider> {
    let provider = SqliteProvider::new(":memory:").await?;
    provider.initialize_schema().await?;
    Ok(provider)
}

#[tokio::test]
async fn test_upsert_user_is_idempotent_and_keeps_latest_name() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store.upsert_user("U1", Some("สมชาย")).await?;
    store.upsert_user("U1", Some("สมหญิง")).await?;

    assert_eq!(count_rows(&store, "users").await, 1);
    assert_eq!(
        store.get_user_name("U1").await?,
        Some("สมหญิง".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_upsert_without_name_preserves_learned_name() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store.upsert_user("U1", Some("สมชาย")).await?;
    store.upsert_user("U1", None).await?;

    assert_eq!(store.get_user_name("U1").await?, Some("สมชาย".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_get_user_name_for_unknown_user_is_none() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store.upsert_user("U1", None).await?;

    assert_eq!(store.get_user_name("U1").await?, None);
    assert_eq!(store.get_user_name("nobody").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_corpus_is_deduplicated_by_phrase() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    assert!(
        store
            .create_knowledge_entry("greeting", "สวัสดี", "สวัสดีค่ะ")
            .await?
    );
    // The identical phrase must be ignored, not duplicated.
    assert!(
        !store
            .create_knowledge_entry("greeting", "สวัสดี", "หวัดดีจ้า")
            .await?
    );
    assert!(
        store
            .create_knowledge_entry("greeting", "ลาก่อน", "แล้วเจอกันค่ะ")
            .await?
    );

    let corpus = store.fetch_corpus("greeting").await?;
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[0].phrase, "สวัสดี");
    assert_eq!(corpus[0].reply, "สวัสดีค่ะ");
    assert_eq!(corpus[1].phrase, "ลาก่อน");
    Ok(())
}

#[tokio::test]
async fn test_corpus_categories_are_isolated() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store
        .create_knowledge_entry("greeting", "สวัสดี", "สวัสดีค่ะ")
        .await?;
    store
        .create_knowledge_entry("barista", "กาแฟอะไรอร่อย", "ลาเต้ค่ะ")
        .await?;

    assert_eq!(store.fetch_corpus("greeting").await?.len(), 1);
    assert_eq!(store.fetch_corpus("barista").await?.len(), 1);
    assert_eq!(
        store.lookup_reply("barista", "กาแฟอะไรอร่อย").await?,
        Some("ลาเต้ค่ะ".to_string())
    );
    assert_eq!(store.lookup_reply("greeting", "กาแฟอะไรอร่อย").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_qa_pair_round_trip() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store.upsert_user("U1", None).await?;
    store
        .create_qa_pair("U1", "วันนี้วันอะไร", "วันจันทร์")
        .await?;

    assert_eq!(
        store.lookup_previous_answer("วันนี้วันอะไร").await?,
        Some("วันจันทร์".to_string())
    );
    assert_eq!(store.lookup_previous_answer("พรุ่งนี้วันอะไร").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_repeated_question_returns_newest_answer() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store.upsert_user("U1", None).await?;
    store
        .create_qa_pair("U1", "วันนี้วันอะไร", "วันจันทร์")
        .await?;
    store
        .create_qa_pair("U1", "วันนี้วันอะไร", "วันอังคาร")
        .await?;

    assert_eq!(
        store.lookup_previous_answer("วันนี้วันอะไร").await?,
        Some("วันอังคาร".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_log_chat_turn_appends_rows() -> Result<()> {
    setup_tracing();
    let store = new_store().await?;

    store.upsert_user("U1", None).await?;
    store
        .log_chat_turn("U1", "สวัสดี", "สวัสดีค่ะ", 1_700_000_000_000)
        .await?;
    store
        .log_chat_turn("U1", "ลาก่อน", "แล้วเจอกันค่ะ", 1_700_000_000_001)
        .await?;

    assert_eq!(count_rows(&store, "chat_log").await, 2);
    Ok(())
}
