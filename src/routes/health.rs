use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(root))
        .route("/info", get(info))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    corpus: &'static str,
    index: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoResponse {
    service: &'static str,
    version: String,
    environment: String,
    start_time: String,
    uptime: u64,
    corpus_items: usize,
    index_vectors: usize,
    predictor: &'static str,
    llm_model: String,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    version: String,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: ReadinessChecks,
}

#[derive(Serialize)]
struct ReadinessChecks {
    corpus: bool,
    index: bool,
    ollama: bool,
    predictor: &'static str,
}

async fn root(State(state): State<AppState>) -> Response {
    let corpus_ok = !state.corpus().is_empty();
    let index_ok = !state.index().is_empty();
    let ok = corpus_ok && index_ok;

    let response = HealthResponse {
        status: if ok { "ok" } else { "degraded" },
        corpus: if corpus_ok { "loaded" } else { "empty" },
        index: if index_ok { "loaded" } else { "empty" },
        timestamp: now_iso(),
    };

    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let response = InfoResponse {
        service: "classmate-backend",
        version: app_version(),
        environment: std::env::var("APP_ENV")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "development".to_string()),
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
        corpus_items: state.corpus().len(),
        index_vectors: state.index().len(),
        predictor: state.mastery().predictor().mode(),
        llm_model: state.llm().model().to_string(),
    };

    Json(response).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    let response = LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        version: app_version(),
    };
    Json(response).into_response()
}

async fn ready(State(state): State<AppState>) -> Response {
    let corpus_ok = !state.corpus().is_empty();
    let index_ok = !state.index().is_empty();
    let ollama_ok = state.llm().is_available().await;

    let status = if !corpus_ok || !index_ok {
        "unhealthy"
    } else if !ollama_ok {
        "degraded"
    } else {
        "healthy"
    };

    let response = ReadinessResponse {
        status,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        checks: ReadinessChecks {
            corpus: corpus_ok,
            index: index_ok,
            ollama: ollama_ok,
            predictor: state.mastery().predictor().mode(),
        },
    };

    let status_code = match status {
        "healthy" | "degraded" => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

fn app_version() -> String {
    std::env::var("APP_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
