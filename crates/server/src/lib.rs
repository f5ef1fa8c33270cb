//! # mali-server
//!
//! The thin HTTP surface over the resolution engine: a messaging-platform
//! webhook, a direct chat endpoint, and liveness routes. All decision logic
//! lives in the `mali` library; handlers only parse payloads, call the
//! resolver, and map outcomes to replies.

pub mod config;
mod errors;

use self::{config::AppConfig, errors::AppError};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use mali::providers::ai::ollama::OllamaProvider;
use mali::providers::db::sqlite::SqliteProvider;
use mali::{Resolution, ResolutionSource, ResolverClient, ResolverClientBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// The shared application state: one resolver for all requests.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverClient>,
}

/// Builds the shared application state from the configuration.
///
/// This wires the SQLite knowledge store, the Ollama generation provider,
/// and the embedding endpoint into one resolver.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = SqliteProvider::new(&config.db_url).await?;
    store.initialize_schema().await?;

    let ai_provider = OllamaProvider::new(
        config.generation.api_url.clone(),
        config.generation.model_name.clone(),
        Duration::from_secs(config.generation.timeout_secs),
    )?;

    let resolver = ResolverClientBuilder::new()
        .knowledge_store(Box::new(store))
        .ai_provider(Box::new(ai_provider))
        .embedding(config.embedding.clone())
        .config(config.resolver.clone())
        .build()?;

    Ok(AppState {
        resolver: Arc::new(resolver),
    })
}

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/webhook", post(webhook_handler))
        .route("/chat", post(chat_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

/// The root handler.
async fn root() -> &'static str {
    "mali server is running."
}

/// The health check handler.
async fn health_check() -> &'static str {
    "OK"
}

// --- Webhook types, shaped like the messaging platform's delivery ---

#[derive(Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    events: Vec<WebhookEvent>,
}

#[derive(Deserialize)]
struct WebhookEvent {
    #[serde(default)]
    message: Option<WebhookMessage>,
    #[serde(rename = "replyToken")]
    reply_token: Option<String>,
    #[serde(default)]
    source: Option<WebhookSource>,
}

#[derive(Deserialize)]
struct WebhookMessage {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct WebhookSource {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Serialize)]
struct WebhookResponse {
    replies: Vec<ReplyMessage>,
}

#[derive(Serialize)]
struct ReplyMessage {
    reply_token: String,
    text: String,
}

/// Appends the delivery particle to engine-produced content.
///
/// Name-intent and fallback texts already carry their politeness particle,
/// so only canned, history, and generated replies get the suffix.
fn localize_reply(resolution: &Resolution) -> String {
    match resolution.source {
        ResolutionSource::Canned | ResolutionSource::History | ResolutionSource::Generated => {
            format!("{} ค่ะ", resolution.reply)
        }
        _ => resolution.reply.clone(),
    }
}

/// The handler for the messaging webhook.
///
/// Resolves every text event and answers with one reply per reply token.
/// Resolution failures become their per-kind apology text; the webhook
/// itself always answers 200 so the platform does not retry delivery.
async fn webhook_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<WebhookResponse> {
    let mut replies = Vec::new();

    for event in payload.events {
        let (Some(reply_token), Some(text), Some(user_id)) = (
            event.reply_token,
            event.message.and_then(|m| m.text),
            event.source.and_then(|s| s.user_id),
        ) else {
            continue;
        };

        info!(user_id = %user_id, "Received webhook message");

        let text = match app_state.resolver.resolve(&user_id, &text).await {
            Ok(resolution) => localize_reply(&resolution),
            Err(e) => {
                error!("Resolution failed: {e:?}");
                e.user_reply().to_string()
            }
        };

        replies.push(ReplyMessage { reply_token, text });
    }

    Json(WebhookResponse { replies })
}

/// The request body for the `/chat` endpoint.
#[derive(Deserialize)]
struct ChatRequest {
    user_id: String,
    text: String,
}

/// The response body for the `/chat` endpoint.
#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    source: ResolutionSource,
}

/// The handler for the `/chat` endpoint: a direct proxy into the resolver
/// without any platform framing.
async fn chat_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    info!(user_id = %payload.user_id, "Received chat request");

    let resolution = app_state
        .resolver
        .resolve(&payload.user_id, &payload.text)
        .await?;

    Ok(Json(ChatResponse {
        reply: resolution.reply,
        source: resolution.source,
    }))
}

/// The main entry point for running the server.
pub async fn run(listener: tokio::net::TcpListener, config: AppConfig) -> anyhow::Result<()> {
    let app_state = build_app_state(config).await?;
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
