use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

/// Cache key for one generated quiz payload.
pub fn cache_key(topic: &str, subtopic: &str, difficulty: &str) -> String {
    format!("{topic}|{subtopic}|{difficulty}")
}

/// File-backed store of generated quizzes. The whole map lives in memory
/// and every insert is written through to disk, so cached quizzes survive
/// restarts and repeat requests skip the language model entirely.
pub struct QuizCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, Value>>,
}

impl QuizCache {
    /// Loads the cache file if present. A missing or unreadable file just
    /// starts the cache empty.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<HashMap<String, Value>>(&contents) {
                Ok(map) => {
                    info!(count = map.len(), path = %path.display(), "Loaded quiz cache");
                    map
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Quiz cache file invalid, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Quiz cache read failed, starting empty");
                HashMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Inserts an entry and writes the whole map back to disk. A failed
    /// write keeps the in-memory entry and logs the error.
    pub async fn store(&self, key: String, payload: Value) {
        let snapshot = {
            let mut entries = self.entries.write();
            entries.insert(key, payload);
            entries.clone()
        };

        let serialized = match serde_json::to_string_pretty(&snapshot) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize quiz cache");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, serialized).await {
            warn!(error = %e, path = %self.path.display(), "Failed to save quiz cache");
        }
    }
}
