use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tempfile::TempDir;

use classmate_backend::corpus::{ContentLayer, CorpusItem, CorpusStore, Difficulty};
use classmate_backend::create_app;
use classmate_backend::mastery::{MasteryEngine, MasteryPredictor};
use classmate_backend::retrieval::RetrievalEngine;
use classmate_backend::search::VectorIndex;
use classmate_backend::services::embedding_provider::{EmbeddingConfig, EmbeddingProvider};
use classmate_backend::services::llm_provider::{LlmConfig, LlmProvider};
use classmate_backend::services::QuizCache;
use classmate_backend::state::AppState;

pub fn sample_item(
    id: &str,
    topic: &str,
    layer: ContentLayer,
    difficulty: Difficulty,
) -> CorpusItem {
    CorpusItem {
        id: id.to_string(),
        topic: Some(topic.to_string()),
        subtopic: Some("Basic Limit Concept".to_string()),
        chapter: Some(1),
        layer,
        difficulty,
        content_type: Some("explanation".to_string()),
        source: Some("OpenStax Calculus".to_string()),
        content: Some(format!("{} review material", topic)),
        metadata: Default::default(),
    }
}

/// App state with a tiny in-memory corpus, a matching index, a mocked LLM,
/// and an embedding endpoint that refuses connections. Retrieval paths run,
/// hit the dead endpoint, and degrade to empty results.
///
/// The returned `TempDir` backs the quiz cache; keep it alive for the
/// duration of the test.
pub async fn create_test_state() -> (AppState, TempDir) {
    let corpus = Arc::new(CorpusStore::from_items(vec![
        sample_item("c1", "Limits", ContentLayer::Conceptual, Difficulty::Easy),
        sample_item("c2", "Limits", ContentLayer::Procedural, Difficulty::Medium),
        sample_item("c3", "Derivatives", ContentLayer::Video, Difficulty::Easy),
    ]));

    let index = Arc::new(VectorIndex::from_vectors(
        4,
        vec![
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
        ],
    ));

    let embedder = Arc::new(EmbeddingProvider::new(EmbeddingConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        model: "nomic-embed-text".to_string(),
        timeout: Duration::from_millis(50),
        dimension: 4,
    }));

    let llm = Arc::new(LlmProvider::new(LlmConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        model: "mock-model".to_string(),
        timeout: Duration::from_millis(50),
        mock: true,
    }));

    let mastery = Arc::new(MasteryEngine::new(MasteryPredictor::Heuristic));

    let retrieval = Arc::new(RetrievalEngine::new(
        Arc::clone(&corpus),
        Arc::clone(&index),
        Arc::clone(&embedder),
        Arc::clone(&mastery),
    ));

    let cache_dir = TempDir::new().expect("failed to create temp dir");
    let quiz_cache = Arc::new(QuizCache::load(cache_dir.path().join("quiz_cache.json")).await);

    (
        AppState::new(corpus, index, embedder, llm, mastery, retrieval, quiz_cache),
        cache_dir,
    )
}

pub async fn create_test_app() -> (Router, TempDir) {
    let (state, cache_dir) = create_test_state().await;
    (create_app(state), cache_dir)
}
