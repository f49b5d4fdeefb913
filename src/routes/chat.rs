use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::{json_error, AppError};
use crate::retrieval::ScoredItem;
use crate::services::prompts::{self, StudentProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ChatTurn {
    role: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    /// Accepted for client compatibility; each turn is answered from
    /// retrieved context alone.
    #[serde(default)]
    history: Vec<ChatTurn>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    user_profile: Option<StudentProfile>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    context: Vec<ScoredItem>,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/generate", post(generate))
}

async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .retrieval()
        .retrieve(&payload.message, payload.user_id.as_deref())
        .await;

    let context = prompts::build_context(&outcome.results);
    let prompt = prompts::tutor_chat_prompt(
        &payload.message,
        &context,
        payload.user_profile.as_ref(),
    );

    let response = state.llm().generate(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, "Chat generation failed");
        json_error(StatusCode::BAD_GATEWAY, "LLM_ERROR", "Tutor response failed")
    })?;

    Ok(Json(ChatResponse {
        response,
        context: outcome.results,
    }))
}

async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = state.llm().generate(&payload.prompt).await.map_err(|e| {
        tracing::warn!(error = %e, "Generation failed");
        json_error(StatusCode::BAD_GATEWAY, "LLM_ERROR", "Generation failed")
    })?;

    Ok(Json(GenerateResponse { text }))
}
