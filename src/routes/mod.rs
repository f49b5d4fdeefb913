mod chapters;
mod chat;
mod health;
mod mastery;
mod quizzes;
mod search;
mod topics;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::Serialize;

use crate::response::json_error;
use crate::retrieval::ScoredItem;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(search::router())
        .merge(topics::router())
        .merge(chat::router())
        .merge(chapters::router())
        .merge(quizzes::router())
        .merge(mastery::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}

const MAX_SOURCES: usize = 10;

/// Provenance entry echoed back alongside generated content so the client
/// can show where the material came from.
#[derive(Debug, Serialize)]
pub struct RagSource {
    pub id: String,
    pub topic: String,
    pub subtopic: String,
    pub content: String,
    pub content_type: String,
    pub score: f32,
    pub source: String,
}

impl RagSource {
    /// Items with no id fall back to their position; missing content kinds
    /// take the caller's default.
    pub fn from_items(items: &[ScoredItem], default_kind: &str) -> Vec<RagSource> {
        items
            .iter()
            .take(MAX_SOURCES)
            .enumerate()
            .map(|(i, scored)| {
                let item = &scored.item;
                RagSource {
                    id: if item.id.is_empty() {
                        i.to_string()
                    } else {
                        item.id.clone()
                    },
                    topic: item.topic.clone().unwrap_or_default(),
                    subtopic: item.subtopic.clone().unwrap_or_default(),
                    content: item.content.clone().unwrap_or_default(),
                    content_type: item
                        .content_type
                        .clone()
                        .unwrap_or_else(|| default_kind.to_string()),
                    score: scored.score,
                    source: item.source.clone().unwrap_or_else(|| "Unknown".to_string()),
                }
            })
            .collect()
    }
}
