#![allow(dead_code)]

//! Background tasks. The only worker is the quiz prewarm pass, a one-shot
//! job that fills the quiz cache for every catalog entry so first quiz
//! requests are served without waiting on the model.

use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::corpus::CALCULUS_TOPICS;
use crate::routes::RagSource;
use crate::services::llm_provider::LlmError;
use crate::services::prompts;
use crate::services::quiz_cache::cache_key;
use crate::state::AppState;

const PREWARM_DIFFICULTY: &str = "Medium";
const PREWARM_QUESTIONS: u32 = 5;
const PREWARM_CONTEXT_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
enum PrewarmError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("quiz payload was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn spawn_quiz_prewarm(state: AppState) {
    tokio::spawn(async move {
        run_quiz_prewarm(state).await;
    });
}

/// Walks the catalog and generates whatever the cache is missing. Entries
/// already present are kept, so restarts resume instead of regenerating.
async fn run_quiz_prewarm(state: AppState) {
    let start = Instant::now();

    if !state.llm().is_available().await {
        warn!("Ollama not reachable, skipping quiz prewarm");
        return;
    }

    let total: usize = CALCULUS_TOPICS.iter().map(|(_, subs)| subs.len()).sum();
    info!(total, cached = state.quiz_cache().len(), "Starting quiz prewarm");

    let mut generated = 0usize;
    let mut failed = 0usize;

    for (topic, subtopics) in CALCULUS_TOPICS {
        for subtopic in *subtopics {
            let key = cache_key(topic, subtopic, PREWARM_DIFFICULTY);
            if state.quiz_cache().get(&key).is_some() {
                continue;
            }

            match generate_one(&state, topic, subtopic).await {
                Ok(payload) => {
                    state.quiz_cache().store(key, payload).await;
                    generated += 1;
                    info!(topic, subtopic, "Prewarmed quiz");
                }
                Err(err) => {
                    warn!(topic, subtopic, error = %err, "Quiz prewarm entry failed");
                    failed += 1;
                }
            }
        }
    }

    info!(
        generated,
        failed,
        duration_ms = start.elapsed().as_millis() as u64,
        "Quiz prewarm complete"
    );
}

async fn generate_one(
    state: &AppState,
    topic: &str,
    subtopic: &str,
) -> Result<Value, PrewarmError> {
    let query = format!("{} {} practice problems quiz", topic, subtopic);
    let docs = state
        .retrieval()
        .search_plain(&query, PREWARM_CONTEXT_LIMIT)
        .await;
    let context = prompts::bullet_context(&docs);
    let prompt =
        prompts::quiz_prompt(topic, subtopic, PREWARM_QUESTIONS, PREWARM_DIFFICULTY, &context);

    let raw = state.llm().generate(&prompt).await?;
    let quiz: Value = serde_json::from_str(prompts::strip_code_fences(&raw))?;

    Ok(serde_json::json!({
        "quiz": quiz,
        "rag_sources": RagSource::from_items(&docs, "explanation"),
    }))
}
