use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const DEFAULT_MODEL: &str = "llama3.1:8b";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_MS: u64 = 120_000;
const PROBE_TIMEOUT_MS: u64 = 2_000;
const MAX_RETRIES: usize = 3;
const BASE_BACKOFF_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// When set, skip the network and answer every prompt with a canned
    /// placeholder. Lets the rest of the pipeline run without a local
    /// Ollama install.
    pub mock: bool,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for a local Ollama instance. Generation goes through
/// `/api/generate` with streaming disabled, so one request yields one
/// complete completion string.
#[derive(Clone)]
pub struct LlmProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl LlmProvider {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        let base_url = env_string("OLLAMA_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = env_string("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout =
            Duration::from_millis(env_u64("OLLAMA_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS));
        let mock = env_string("OLLAMA_MOCK")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self::new(LlmConfig {
            base_url,
            model,
            timeout,
            mock,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Cheap liveness probe against the Ollama tags endpoint.
    pub async fn is_available(&self) -> bool {
        if self.config.mock {
            return true;
        }
        let url = format!("{}/api/tags", self.config.base_url);
        self.client
            .get(&url)
            .timeout(Duration::from_millis(PROBE_TIMEOUT_MS))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    /// Runs one completion and returns the generated text. Retries
    /// transient failures before giving up.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if self.config.mock {
            return Ok(mock_response(prompt));
        }
        let url = format!("{}/api/generate", self.config.base_url);
        let payload = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let resp = self.post_with_retry(&url, &payload).await?;
        Ok(resp.response)
    }

    async fn post_with_retry<T: serde::Serialize>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<GenerateResponse, LlmError> {
        let mut last_error = None;

        for retry in 0..=MAX_RETRIES {
            match self.client.post(url).json(payload).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let bytes = resp.bytes().await?;
                        match serde_json::from_slice(&bytes) {
                            Ok(v) => return Ok(v),
                            Err(e) => {
                                let body_str = String::from_utf8_lossy(&bytes);
                                tracing::error!(
                                    "Failed to parse Ollama response JSON: {}. Body: {}",
                                    e,
                                    body_str
                                );
                                return Err(LlmError::Json(e));
                            }
                        }
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = LlmError::HttpStatus { status, body };
                    if retry < MAX_RETRIES && is_retryable(status) {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, ?status, "Ollama request failed, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    let err = LlmError::Request(e);
                    if retry < MAX_RETRIES {
                        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
                        warn!(retry, "Ollama request error, retrying");
                        sleep(backoff).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        Err(last_error.unwrap_or(LlmError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "retry loop exhausted".to_string(),
        }))
    }
}

fn mock_response(prompt: &str) -> String {
    let excerpt: String = prompt.chars().take(80).collect();
    format!(
        "[offline placeholder]\nNo language model is reachable, so this is a canned reply.\n\
         Prompt started with: {excerpt}\n\
         Set OLLAMA_URL to a running Ollama instance for real answers."
    )
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_response_defaults_missing_field() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.response, "");

        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"response": "The limit is 4."}"#).unwrap();
        assert_eq!(parsed.response, "The limit is 4.");
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let req = GenerateRequest {
            model: "llama3.1:8b",
            prompt: "Explain the chain rule",
            stream: false,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "llama3.1:8b");
        assert_eq!(value["prompt"], "Explain the chain rule");
        assert_eq!(value["stream"], false);
    }

    #[tokio::test]
    async fn test_mock_mode_answers_without_network() {
        let provider = LlmProvider::new(LlmConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_millis(10),
            mock: true,
        });

        assert!(provider.is_available().await);
        let reply = provider.generate("Explain limits").await.unwrap();
        assert!(reply.contains("Explain limits"));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable(reqwest::StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(reqwest::StatusCode::BAD_REQUEST));
        assert!(!is_retryable(reqwest::StatusCode::NOT_FOUND));
    }
}
