use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::retrieval::{Intent, RetrievalPolicy, ScoredItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    results: Vec<ScoredItem>,
}

#[derive(Debug, Deserialize)]
struct RetrieveRequest {
    query: String,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct RetrieveResponse {
    intent: Intent,
    policy: RetrievalPolicy,
    results: Vec<ScoredItem>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", post(search))
        .route("/retrieve", post(retrieve))
}

async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.index().is_empty() {
        return Err(AppError::unavailable("Search index not loaded"));
    }

    let results = state.retrieval().search_plain(&payload.query, payload.limit).await;
    Ok(Json(SearchResponse { results }))
}

async fn retrieve(
    State(state): State<AppState>,
    Json(payload): Json<RetrieveRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.index().is_empty() {
        return Err(AppError::unavailable("Search index not loaded"));
    }

    let outcome = state
        .retrieval()
        .retrieve(&payload.query, payload.user_id.as_deref())
        .await;

    Ok(Json(RetrieveResponse {
        intent: outcome.intent,
        policy: outcome.policy,
        results: outcome.results,
    }))
}
