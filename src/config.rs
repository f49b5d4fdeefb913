use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub corpus_path: PathBuf,
    pub index_path: PathBuf,
    pub model_path: PathBuf,
    pub quiz_cache_path: PathBuf,
    pub prewarm_quizzes: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let corpus_path = env_path("CORPUS_PATH", "data/corpus.json");
        let index_path = env_path("INDEX_PATH", "data/embeddings.json");
        let model_path = env_path("MASTERY_MODEL_PATH", "data/mastery_model.json");
        let quiz_cache_path = env_path("QUIZ_CACHE_PATH", "data/quiz_cache.json");

        let prewarm_quizzes = std::env::var("ENABLE_QUIZ_PREWARM")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            host,
            port,
            log_level,
            corpus_path,
            index_path,
            model_path,
            quiz_cache_path,
            prewarm_quizzes,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
