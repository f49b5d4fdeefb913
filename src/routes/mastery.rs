use std::collections::HashMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::mastery::types::{
    lenient_bool, InteractionRecord, LevelAssessment, QuestionResult, QuizMasteryReport,
    QuizOutcome,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PredictMasteryRequest {
    user_id: String,
    #[serde(default)]
    time_taken: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    correct: bool,
    #[serde(default = "default_attempt_count")]
    attempt_count: u32,
    #[serde(default)]
    hint_count: u32,
    #[serde(default, deserialize_with = "lenient_bool")]
    bottom_hint: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    scaffold: bool,
}

fn default_attempt_count() -> u32 {
    1
}

#[derive(Debug, Serialize)]
struct PredictMasteryResponse {
    mastery_score: f64,
}

#[derive(Debug, Deserialize)]
struct QuizSubmissionRequest {
    user_id: String,
    topic: String,
    subtopic: String,
    #[serde(default)]
    questions: Vec<QuestionResult>,
}

#[derive(Debug, Serialize)]
struct QuizSubmissionResponse {
    #[serde(flatten)]
    report: QuizMasteryReport,
    success: bool,
}

#[derive(Debug, Deserialize)]
struct AssessmentRequest {
    user_id: String,
    #[serde(default)]
    quiz_history: Vec<QuizOutcome>,
    #[serde(default)]
    topic_mastery: HashMap<String, f64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict-mastery", post(predict_mastery))
        .route("/submit_quiz_ml", post(submit_quiz))
        .route("/assess_user_level", post(assess_user_level))
}

/// Scores a single graded attempt and folds it into the learner's history.
async fn predict_mastery(
    State(state): State<AppState>,
    Json(payload): Json<PredictMasteryRequest>,
) -> impl IntoResponse {
    let interaction = InteractionRecord {
        time_taken: payload.time_taken,
        correct: payload.correct,
        attempt_count: payload.attempt_count,
        hint_count: payload.hint_count,
        bottom_hint: payload.bottom_hint,
        scaffold: payload.scaffold,
    };

    let score = state
        .mastery()
        .score_interaction(&payload.user_id, &interaction);

    Json(PredictMasteryResponse {
        mastery_score: score,
    })
}

async fn submit_quiz(
    State(state): State<AppState>,
    Json(payload): Json<QuizSubmissionRequest>,
) -> impl IntoResponse {
    tracing::info!(
        user_id = %payload.user_id,
        topic = %payload.topic,
        questions = payload.questions.len(),
        "Scoring quiz submission"
    );

    let report = state.mastery().submit_quiz(
        &payload.user_id,
        &payload.topic,
        &payload.subtopic,
        &payload.questions,
    );

    Json(QuizSubmissionResponse {
        report,
        success: true,
    })
}

async fn assess_user_level(
    State(state): State<AppState>,
    Json(payload): Json<AssessmentRequest>,
) -> Json<LevelAssessment> {
    tracing::info!(
        user_id = %payload.user_id,
        quizzes = payload.quiz_history.len(),
        "Assessing learner level"
    );

    let assessment = state.mastery().assess_level(
        &payload.user_id,
        &payload.quiz_history,
        &payload.topic_mastery,
    );

    Json(assessment)
}
