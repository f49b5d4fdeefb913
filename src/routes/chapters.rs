use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::{json_error, AppError};
use crate::retrieval::ScoredItem;
use crate::services::prompts;
use crate::state::AppState;

use super::RagSource;

/// Shown when neither retrieval nor the corpus yields a topic video.
const FALLBACK_VIDEO_URL: &str = "https://www.youtube.com/embed/HfACrKJ_Y2w";

const CHAPTER_CONTEXT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct ChapterRequest {
    topic: String,
    subtopic: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
}

fn default_difficulty() -> String {
    "Medium".to_string()
}

#[derive(Debug, Serialize)]
struct ChapterResponse {
    title: String,
    content: String,
    video_url: String,
    references: Vec<ScoredItem>,
    rag_sources: Vec<RagSource>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate_learning_chapter", post(generate_learning_chapter))
}

async fn generate_learning_chapter(
    State(state): State<AppState>,
    Json(payload): Json<ChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let query = format!("{} {} concepts explanation example", payload.topic, payload.subtopic);
    let docs = state
        .retrieval()
        .search_plain(&query, CHAPTER_CONTEXT_LIMIT)
        .await;

    let context = prompts::bullet_context(&docs);
    let prompt = prompts::chapter_prompt(
        &payload.topic,
        &payload.subtopic,
        &payload.difficulty,
        &context,
    );

    let content = state.llm().generate(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, topic = %payload.topic, "Chapter generation failed");
        json_error(StatusCode::BAD_GATEWAY, "LLM_ERROR", "Chapter generation failed")
    })?;

    let video_url = docs
        .iter()
        .find(|d| d.item.content_type.as_deref() == Some("video") && d.item.content.is_some())
        .and_then(|d| d.item.content.clone())
        .or_else(|| {
            state
                .corpus()
                .find_video_for_topic(&payload.topic)
                .and_then(|item| item.url().map(|u| u.to_string()))
        })
        .unwrap_or_else(|| FALLBACK_VIDEO_URL.to_string());

    let rag_sources = RagSource::from_items(&docs, "explanation");

    Ok(Json(ChapterResponse {
        title: format!("{}: {}", payload.topic, payload.subtopic),
        content,
        video_url,
        references: docs,
        rag_sources,
    }))
}
