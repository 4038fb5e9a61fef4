//! Chat, stats, and health handlers

use axum::{extract::State, Json};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::gateway::prompt::{GREETINGS, WELCOME_MESSAGE};
use crate::server::state::AppState;
use crate::types::{ApiCallStats, SessionStats};

/// Inbound chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub user_input: String,
    /// Session id; one is generated when the client omits it
    #[serde(default)]
    pub userid: Option<String>,
}

/// Chat reply
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The answer text
    pub next_question: String,
    /// Session id the client should send back on the next turn
    pub userid: String,
    /// "ready" for the greeting reply, "success" for answered turns
    pub status: &'static str,
}

/// Statistics snapshot
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// LLM call counters
    pub api_stats: ApiCallStats,
    /// Whether the knowledge base has been built
    pub vectorstore_ready: bool,
    /// Session store counters
    pub session_stats: SessionStats,
}

/// Anonymous session ids look like `test_x7k2m9qp1`
fn generate_test_id() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("test_{}", suffix)
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let user_input = request.user_input.trim().to_string();
    let userid = request
        .userid
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(generate_test_id);

    tracing::info!("Received message from user {}: {}", userid, user_input);

    if user_input.is_empty() {
        return Err(Error::Config("Please provide a message".to_string()));
    }

    // Greetings get a canned welcome without touching the index, so a
    // fresh deploy can say hello before the knowledge base exists.
    if GREETINGS.contains(&user_input.to_lowercase().as_str()) {
        return Ok(Json(ChatResponse {
            next_question: WELCOME_MESSAGE.to_string(),
            userid,
            status: "ready",
        }));
    }

    // Lazy initialization on the first real message
    let engine = state.engine();
    if !engine.is_initialized() {
        tracing::info!("Initializing knowledge base on first request...");
        engine.initialize_knowledge_base().await?;
    }

    let (answer, _sources) = engine.answer(&userid, &user_input).await;

    Ok(Json(ChatResponse {
        next_question: answer,
        userid,
        status: "success",
    }))
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine();
    Json(StatsResponse {
        api_stats: engine.api_stats(),
        vectorstore_ready: engine.is_initialized(),
        session_stats: engine.session_stats(),
    })
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "persona-rag",
    }))
}
