//! # Conversational Knowledge Resolution
//!
//! This crate resolves Thai-language chat utterances through an ordered
//! fallback chain: a semantic match against a curated canned corpus, an
//! exact-text match against previously answered questions, and finally a
//! generative model, persisting every new exchange back into the knowledge
//! store for future reuse.

pub mod corpus;
pub mod errors;
pub mod prompts;
pub mod providers;
pub mod similarity;
pub mod types;

pub use errors::ResolveError;
pub use types::{
    EmbeddingConfig, Resolution, ResolutionSource, ResolverClient, ResolverClientBuilder,
    ResolverConfig,
};

use crate::corpus::EmbeddedCorpus;
use crate::providers::ai::{generate_embedding, generate_embeddings};
use crate::similarity::best_match;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A keyword-detected intent about the user's own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameIntent {
    /// The user asks what their name is.
    Query,
    /// The user introduces themselves. The payload is the extracted name,
    /// empty when nothing followed the keyword.
    Introduce(String),
}

/// Strips polite sentence endings and surrounding whitespace.
///
/// The normalized form is what the pipeline matches, logs, and persists, so
/// "สวัสดีครับ" and "สวัสดีค่ะ" resolve to the same history entries.
pub fn normalize_utterance(text: &str) -> String {
    let mut message = text.to_string();
    for ending in prompts::POLITE_ENDINGS {
        message = message.replace(ending, "");
    }
    message.trim().to_string()
}

/// Detects name questions and self-introductions by keyword.
///
/// "เชื่อ" (to believe) contains "ชื่อ" (name) as a substring, so messages
/// mentioning it are not treated as introductions.
pub fn detect_name_intent(message: &str) -> Option<NameIntent> {
    if !message.contains("ชื่อ") {
        return None;
    }
    if message.contains("อะไร") {
        return Some(NameIntent::Query);
    }
    if message.contains("เชื่อ") {
        return None;
    }
    let name = message.rsplit("ชื่อ").next().unwrap_or("").trim();
    Some(NameIntent::Introduce(name.to_string()))
}

impl ResolverClient {
    /// Resolves one utterance through the fallback chain.
    ///
    /// The stages run in order: normalization, keyword name intents, the
    /// canned corpus match (high threshold), the semantic name question
    /// (lower threshold), the exact-text history match, and finally the
    /// generative fallback with best-effort persistence of the new pair.
    ///
    /// Store failures before a reply is found abort with
    /// [`ResolveError::StoreUnavailable`]; once a reply exists, logging and
    /// persistence failures are recorded but never surfaced.
    pub async fn resolve(
        &self,
        user_id: &str,
        utterance: &str,
    ) -> Result<Resolution, ResolveError> {
        let message = normalize_utterance(utterance);
        if message.is_empty() {
            return Ok(Resolution {
                reply: prompts::EMPTY_UTTERANCE_REPLY.to_string(),
                source: ResolutionSource::Unrecognized,
            });
        }

        info!("[resolve] received utterance: {message:?}");

        // Every later write references this user row.
        self.store.upsert_user(user_id, None).await?;

        if let Some(intent) = detect_name_intent(&message) {
            let reply = match intent {
                NameIntent::Query => match self.store.get_user_name(user_id).await? {
                    Some(name) => prompts::name_recall_reply(&name),
                    None => prompts::NAME_UNKNOWN_REPLY.to_string(),
                },
                NameIntent::Introduce(name) if name.is_empty() => {
                    prompts::NAME_ASK_AGAIN_REPLY.to_string()
                }
                NameIntent::Introduce(name) => {
                    self.store.upsert_user(user_id, Some(&name)).await?;
                    prompts::name_thanks_reply(&name)
                }
            };
            self.log_turn(user_id, &message, &reply).await;
            return Ok(Resolution {
                reply,
                source: ResolutionSource::NameIntent,
            });
        }

        // MATCH_CANNED: one embedding of the utterance serves this stage
        // and the semantic name question below.
        let query_vector = generate_embedding(
            &self.embedding.api_url,
            &self.embedding.model_name,
            &message,
            self.embedding.api_key.as_deref(),
        )
        .await?;

        let corpus = self.canned_corpus().await?;
        if let Some((index, score)) = best_match(&query_vector, &corpus.vectors) {
            debug!(score, phrase = %corpus.entries[index].phrase, "Best canned match");
            if self.config.thresholds.accepts_canned(score) {
                let phrase = &corpus.entries[index].phrase;
                let reply = self
                    .store
                    .lookup_reply(&self.config.corpus_category, phrase)
                    .await?
                    .unwrap_or_else(|| corpus.entries[index].reply.clone());
                self.log_turn(user_id, &message, &reply).await;
                return Ok(Resolution {
                    reply,
                    source: ResolutionSource::Canned,
                });
            }
        }

        // Semantic name question, recall-favoring threshold. Only relevant
        // once a name is known; repeating it is the worst false positive.
        let user_name = self.store.get_user_name(user_id).await?;
        if let Some(name) = &user_name {
            let name_vectors = self.name_query_vectors().await?;
            if let Some((_, score)) = best_match(&query_vector, &name_vectors) {
                if self.config.thresholds.accepts_name_query(score) {
                    let reply = prompts::name_recall_reply(name);
                    self.log_turn(user_id, &message, &reply).await;
                    return Ok(Resolution {
                        reply,
                        source: ResolutionSource::NameIntent,
                    });
                }
            }
        }

        // MATCH_HISTORY: exact text, no re-embedding, no model call.
        if let Some(answer) = self.store.lookup_previous_answer(&message).await? {
            self.log_turn(user_id, &message, &answer).await;
            return Ok(Resolution {
                reply: answer,
                source: ResolutionSource::History,
            });
        }

        // GENERATE
        let prompt =
            prompts::generation_prompt(user_name.as_deref(), &message, self.config.max_reply_words);
        debug!(prompt = %prompt, "--> Sending prompt to the generative fallback");
        let generated = self.ai_provider.generate(&prompt).await?;
        let reply = generated.trim().to_string();
        if reply.is_empty() {
            return Err(ResolveError::GenerationFailed(
                "The model returned an empty response".to_string(),
            ));
        }

        // PERSIST: best-effort. The reply is already in hand; memory is a
        // contract of intent, not a delivery precondition.
        self.persist_generated(user_id, &message, &reply).await;
        self.log_turn(user_id, &message, &reply).await;

        Ok(Resolution {
            reply,
            source: ResolutionSource::Generated,
        })
    }

    async fn persist_generated(&self, user_id: &str, question: &str, answer: &str) {
        if let Err(e) = self.store.create_qa_pair(user_id, question, answer).await {
            warn!(error = %e, "Failed to persist question/answer pair");
        }

        // Reaching the fallback means no corpus phrase scored above the
        // canned threshold, so the new entry is not a near-duplicate.
        match self
            .store
            .create_knowledge_entry(&self.config.corpus_category, question, answer)
            .await
        {
            Ok(true) => self.corpus_cache.invalidate().await,
            Ok(false) => debug!("Knowledge entry already present; corpus unchanged"),
            Err(e) => warn!(error = %e, "Failed to persist knowledge entry"),
        }
    }

    async fn log_turn(&self, user_id: &str, message: &str, reply: &str) {
        let timestamp_ms = Utc::now().timestamp_millis();
        if let Err(e) = self
            .store
            .log_chat_turn(user_id, message, reply, timestamp_ms)
            .await
        {
            warn!(error = %e, "Failed to log chat turn");
        }
    }

    /// Returns the embedded canned corpus, filling the cache on a miss.
    async fn canned_corpus(&self) -> Result<Arc<EmbeddedCorpus>, ResolveError> {
        if let Some(corpus) = self.corpus_cache.get().await {
            return Ok(corpus);
        }

        let entries = self
            .store
            .fetch_corpus(&self.config.corpus_category)
            .await?;
        let phrases: Vec<String> = entries.iter().map(|e| e.phrase.clone()).collect();
        let vectors = generate_embeddings(
            &self.embedding.api_url,
            &self.embedding.model_name,
            &phrases,
            self.embedding.api_key.as_deref(),
        )
        .await?;

        info!(entries = entries.len(), "Embedded canned corpus");
        Ok(self
            .corpus_cache
            .store(EmbeddedCorpus { entries, vectors })
            .await)
    }

    async fn name_query_vectors(&self) -> Result<Arc<Vec<Vec<f32>>>, ResolveError> {
        if let Some(vectors) = self.name_query_cache.get().await {
            return Ok(vectors);
        }

        let phrases: Vec<String> = prompts::NAME_QUERY_PHRASES
            .iter()
            .map(|p| p.to_string())
            .collect();
        let vectors = generate_embeddings(
            &self.embedding.api_url,
            &self.embedding.model_name,
            &phrases,
            self.embedding.api_key.as_deref(),
        )
        .await?;

        Ok(self.name_query_cache.store(vectors).await)
    }
}
