use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::{json_error, AppError};
use crate::services::prompts;
use crate::services::quiz_cache::cache_key;
use crate::state::AppState;

use super::RagSource;

const QUIZ_CONTEXT_LIMIT: usize = 10;
const HINT_CONTEXT_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
struct QuizRequest {
    topic: String,
    subtopic: String,
    #[serde(default = "default_num_questions")]
    num_questions: u32,
    #[serde(default = "default_difficulty")]
    difficulty: String,
}

fn default_num_questions() -> u32 {
    5
}

fn default_difficulty() -> String {
    "Medium".to_string()
}

#[derive(Debug, Deserialize)]
struct DiagnosticRequest {
    #[serde(default = "default_grade")]
    grade: String,
}

fn default_grade() -> String {
    "High School".to_string()
}

#[derive(Debug, Deserialize)]
struct HintRequest {
    question_text: String,
    #[serde(default)]
    user_answer: String,
    topic: String,
    subtopic: String,
}

#[derive(Debug, Serialize)]
struct HintResponse {
    hint: String,
    sources: Vec<RagSource>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate_quiz", post(generate_quiz))
        .route("/generate_diagnostic_quiz", post(generate_diagnostic_quiz))
        .route("/generate_hint", post(generate_hint))
}

/// Serves a cached quiz when one exists for the topic/subtopic/difficulty
/// triple, otherwise generates one and writes it through to the cache.
async fn generate_quiz(
    State(state): State<AppState>,
    Json(payload): Json<QuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = cache_key(&payload.topic, &payload.subtopic, &payload.difficulty);
    if let Some(cached) = state.quiz_cache().get(&key) {
        tracing::info!(topic = %payload.topic, subtopic = %payload.subtopic, "Serving cached quiz");
        return Ok(Json(cached));
    }

    tracing::info!(topic = %payload.topic, subtopic = %payload.subtopic, "Cache miss, generating quiz");

    let query = format!("{} {} practice problems quiz", payload.topic, payload.subtopic);
    let docs = state.retrieval().search_plain(&query, QUIZ_CONTEXT_LIMIT).await;
    let context = prompts::bullet_context(&docs);
    let prompt = prompts::quiz_prompt(
        &payload.topic,
        &payload.subtopic,
        payload.num_questions,
        &payload.difficulty,
        &context,
    );

    let raw = state.llm().generate(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, topic = %payload.topic, "Quiz generation failed");
        json_error(StatusCode::BAD_GATEWAY, "LLM_ERROR", "Quiz generation failed")
    })?;

    let questions: Value =
        serde_json::from_str(prompts::strip_code_fences(&raw)).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse quiz JSON from LLM");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "QUIZ_PARSE_ERROR",
                "Failed to generate valid quiz format",
            )
        })?;

    let quiz_payload = serde_json::json!({
        "quiz": questions,
        "rag_sources": RagSource::from_items(&docs, "explanation"),
    });

    state.quiz_cache().store(key, quiz_payload.clone()).await;

    Ok(Json(quiz_payload))
}

/// Diagnostic quizzes cover the whole curriculum. If the model output cannot
/// be produced or parsed, a static quiz keeps onboarding working.
async fn generate_diagnostic_quiz(
    State(state): State<AppState>,
    Json(payload): Json<DiagnosticRequest>,
) -> impl IntoResponse {
    let prompt = prompts::diagnostic_prompt(&payload.grade);

    let questions = match state.llm().generate(&prompt).await {
        Ok(raw) => match serde_json::from_str::<Value>(prompts::strip_code_fences(&raw)) {
            Ok(parsed) => normalize_diagnostic(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "Diagnostic quiz parse failed, serving fallback");
                fallback_diagnostic_quiz()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Diagnostic generation failed, serving fallback");
            fallback_diagnostic_quiz()
        }
    };

    Json(serde_json::json!({ "quiz": questions }))
}

async fn generate_hint(
    State(state): State<AppState>,
    Json(payload): Json<HintRequest>,
) -> Result<impl IntoResponse, AppError> {
    let query = format!(
        "{} {} {} hint explanation",
        payload.topic, payload.subtopic, payload.question_text
    );
    let docs = state.retrieval().search_plain(&query, HINT_CONTEXT_LIMIT).await;
    let context = prompts::bullet_context(&docs);

    let user_answer = (!payload.user_answer.trim().is_empty()).then_some(payload.user_answer.as_str());
    let prompt = prompts::hint_prompt(&payload.question_text, user_answer, &context);

    let hint = state.llm().generate(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, "Hint generation failed");
        json_error(StatusCode::BAD_GATEWAY, "LLM_ERROR", "Hint generation failed")
    })?;

    Ok(Json(HintResponse {
        hint,
        sources: RagSource::from_items(&docs, "hint"),
    }))
}

/// Model output sometimes names the answer key `correctAnswer`. Normalize to
/// `correct` and backfill from the first option when neither key is present.
fn normalize_diagnostic(mut quiz: Value) -> Value {
    if let Some(questions) = quiz.as_array_mut() {
        for question in questions {
            let Some(obj) = question.as_object_mut() else {
                continue;
            };
            if obj.contains_key("correct") {
                continue;
            }
            let answer = obj.get("correctAnswer").cloned().or_else(|| {
                obj.get("options")
                    .and_then(|opts| opts.as_array())
                    .and_then(|opts| opts.first())
                    .cloned()
            });
            obj.insert(
                "correct".to_string(),
                answer.unwrap_or_else(|| Value::String(String::new())),
            );
        }
    }
    quiz
}

fn fallback_diagnostic_quiz() -> Value {
    serde_json::json!([
        { "id": 1, "question": "What is the limit of (x^2-1)/(x-1) as x approaches 1?", "options": ["0", "1", "2", "undefined"], "correct": "2", "topic": "Limits" },
        { "id": 2, "question": "lim(x→0) sin(x)/x = ?", "options": ["0", "1", "∞", "undefined"], "correct": "1", "topic": "Limits" },
        { "id": 3, "question": "lim(x→∞) (3x^2 + 2x)/(x^2 - 1) = ?", "options": ["0", "3", "∞", "undefined"], "correct": "3", "topic": "Limits" },
        { "id": 4, "question": "What is the derivative of x^2?", "options": ["x", "2x", "x^2", "2"], "correct": "2x", "topic": "Derivatives" },
        { "id": 5, "question": "Chain rule is used for?", "options": ["Composite functions", "Product of functions", "Sum of functions", "Constants"], "correct": "Composite functions", "topic": "Derivatives" },
        { "id": 6, "question": "d/dx[x·sin(x)] = ?", "options": ["sin(x)", "x·cos(x)", "sin(x) + x·cos(x)", "cos(x)"], "correct": "sin(x) + x·cos(x)", "topic": "Derivatives" },
        { "id": 7, "question": "If x^2 + y^2 = 25, find dy/dx", "options": ["-x/y", "x/y", "-y/x", "y/x"], "correct": "-x/y", "topic": "Derivatives" },
        { "id": 8, "question": "∫ 1/x dx = ?", "options": ["ln(x) + C", "e^x + C", "x + C", "1 + C"], "correct": "ln(x) + C", "topic": "Integration" },
        { "id": 9, "question": "∫ cos(x) dx = ?", "options": ["sin(x) + C", "-sin(x) + C", "cos(x) + C", "-cos(x) + C"], "correct": "sin(x) + C", "topic": "Integration" },
        { "id": 10, "question": "∫ 2x dx = ?", "options": ["x^2 + C", "2x^2 + C", "x + C", "2x + C"], "correct": "x^2 + C", "topic": "Integration" },
        { "id": 11, "question": "∫ e^x dx = ?", "options": ["e^x + C", "xe^x + C", "e^(x+1) + C", "ln(x) + C"], "correct": "e^x + C", "topic": "Integration" },
        { "id": 12, "question": "To find maximum/minimum values, we set the derivative equal to:", "options": ["0", "1", "∞", "undefined"], "correct": "0", "topic": "Applications" },
        { "id": 13, "question": "If the radius of a circle increases at 2 cm/s, how fast is the area increasing when r=5?", "options": ["10π cm²/s", "20π cm²/s", "25π cm²/s", "4π cm²/s"], "correct": "20π cm²/s", "topic": "Applications" },
        { "id": 14, "question": "The sum of infinite geometric series 1 + 1/2 + 1/4 + 1/8 + ... is:", "options": ["1", "2", "∞", "1/2"], "correct": "2", "topic": "Series" },
        { "id": 15, "question": "Does the series Σ(1/n) converge?", "options": ["Yes", "No", "Only for n>10", "Depends on n"], "correct": "No", "topic": "Series" }
    ])
}
