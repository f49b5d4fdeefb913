use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::corpus::{CorpusItem, CALCULUS_TOPICS};
use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct TopicResourcesResponse {
    results: Vec<CorpusItem>,
}

#[derive(Debug, Serialize)]
struct TopicEntry {
    topic: &'static str,
    subtopics: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct TopicListResponse {
    topics: Vec<TopicEntry>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/topics", get(list_topics))
        .route("/topic/:topic_name", get(topic_resources))
}

/// Curriculum catalog, in teaching order.
async fn list_topics() -> impl IntoResponse {
    let topics = CALCULUS_TOPICS
        .iter()
        .map(|&(topic, subtopics)| TopicEntry { topic, subtopics })
        .collect();
    Json(TopicListResponse { topics })
}

async fn topic_resources(
    State(state): State<AppState>,
    Path(topic_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.corpus().is_empty() {
        return Err(AppError::unavailable("Corpus not loaded"));
    }

    let results = state.corpus().find_by_topic(&topic_name);
    Ok(Json(TopicResourcesResponse { results }))
}
