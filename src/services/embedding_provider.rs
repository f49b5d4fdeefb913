use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const DEFAULT_MODEL: &str = "nomic-embed-text";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_DIMENSION: usize = 768;
const MAX_RETRIES: usize = 3;
const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub dimension: usize,
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty embedding response")]
    Empty,
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Client for the Ollama embeddings endpoint. Query vectors must come
/// from the same model family that produced the corpus index, so the
/// configured dimension is enforced on every response.
#[derive(Clone)]
pub struct EmbeddingProvider {
    config: EmbeddingConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl EmbeddingProvider {
    pub fn new(config: EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        let base_url = env_string("EMBEDDING_URL")
            .or_else(|| env_string("OLLAMA_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = env_string("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout =
            Duration::from_millis(env_u64("EMBEDDING_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS));
        let dimension = env_usize("EMBEDDING_DIMENSION").unwrap_or(DEFAULT_DIMENSION);

        Self::new(EmbeddingConfig {
            base_url,
            model,
            timeout,
            dimension,
        })
    }

    pub fn is_available(&self) -> bool {
        !self.config.model.trim().is_empty() && !self.config.base_url.trim().is_empty()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Embeds one text and returns its vector.
    pub async fn embed_text(&self, input: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let payload = EmbeddingRequest {
            model: &self.config.model,
            prompt: input,
        };

        let resp = self.post_with_retry(&url, &payload).await?;
        check_dimension(resp.embedding, self.config.dimension)
    }

    async fn post_with_retry<T: serde::Serialize>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<EmbeddingResponse, EmbeddingError> {
        let mut last_error = None;

        for retry in 0..=MAX_RETRIES {
            match self.client.post(url).json(payload).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.json::<EmbeddingResponse>().await?);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = EmbeddingError::HttpStatus { status, body };
                    if retry < MAX_RETRIES && is_retryable(status) {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, ?status, "Embedding request failed, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    let err = EmbeddingError::Request(e);
                    if retry < MAX_RETRIES {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, "Embedding request error, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        Err(last_error.unwrap_or(EmbeddingError::Empty))
    }
}

fn check_dimension(embedding: Vec<f32>, expected: usize) -> Result<Vec<f32>, EmbeddingError> {
    if embedding.is_empty() {
        return Err(EmbeddingError::Empty);
    }
    if embedding.len() != expected {
        return Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(embedding)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

fn env_usize(key: &str) -> Option<usize> {
    env_string(key)?.parse().ok()
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
