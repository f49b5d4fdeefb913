//! Calculus corpus metadata: the read-only item store the retrieval layer
//! resolves search hits against.
//!
//! The corpus is produced offline (concept/problem/video datasets merged into
//! one JSON array with stable `calc_NNNNNN` ids); this module only loads and
//! indexes it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

/// Corpus rows carry explicit `null` for fields the source dataset lacked;
/// map those to the enum's Unknown default instead of failing the row.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Content category of a corpus item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ContentLayer {
    Conceptual,
    Procedural,
    Video,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ContentLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conceptual => "conceptual",
            Self::Procedural => "procedural",
            Self::Video => "video",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "conceptual" => Self::Conceptual,
            "procedural" => Self::Procedural,
            "video" => Self::Video,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Difficulty band of a corpus item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// One normalized corpus entry. `id` is globally unique and stable across
/// corpus rebuilds; row position in the merged array is what the vector index
/// refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub subtopic: Option<String>,
    #[serde(default)]
    pub chapter: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub layer: ContentLayer,
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CorpusItem {
    /// Display title for items whose body lives elsewhere (videos).
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(|v| v.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.metadata.get("url").and_then(|v| v.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory metadata store, indexable by the positions the vector index
/// emits. Items are handed out by value; nothing mutates the store after load.
#[derive(Debug, Default)]
pub struct CorpusStore {
    items: Vec<CorpusItem>,
}

impl CorpusStore {
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let raw = std::fs::read_to_string(path)?;
        let items: Vec<CorpusItem> = serde_json::from_str(&raw)?;
        tracing::info!(count = items.len(), path = %path.display(), "corpus metadata loaded");
        Ok(Self { items })
    }

    pub fn from_items(items: Vec<CorpusItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve a search hit. Out-of-range indices come from stale vector
    /// artifacts built against another corpus revision; callers skip them.
    pub fn get(&self, index: usize) -> Option<&CorpusItem> {
        self.items.get(index)
    }

    /// Case-insensitive substring match, sorted by chapter so results read
    /// in course order. Topics match in either containment direction, so a
    /// compound query like "Derivatives and Applications" still reaches
    /// items filed under the bare topic; subtopics match forward only.
    pub fn find_by_topic(&self, topic: &str) -> Vec<CorpusItem> {
        let needle = topic.to_lowercase();
        let mut matches: Vec<CorpusItem> = self
            .items
            .iter()
            .filter(|item| {
                let topic_hit = item
                    .topic
                    .as_deref()
                    .map(|t| {
                        let t = t.to_lowercase();
                        t.contains(&needle) || needle.contains(&t)
                    })
                    .unwrap_or(false);
                let subtopic_hit = item
                    .subtopic
                    .as_deref()
                    .map(|s| s.to_lowercase().contains(&needle))
                    .unwrap_or(false);
                topic_hit || subtopic_hit
            })
            .cloned()
            .collect();
        matches.sort_by_key(|item| item.chapter.unwrap_or(i64::MAX));
        matches
    }

    /// First video item matching a topic, used as a link fallback when
    /// generated chapters carry no video of their own.
    pub fn find_video_for_topic(&self, topic: &str) -> Option<CorpusItem> {
        self.find_by_topic(topic)
            .into_iter()
            .find(|item| item.layer == ContentLayer::Video || item.content_type.as_deref() == Some("video"))
    }
}

/// Course catalog: the topics and subtopics quizzes and chapters are
/// generated over. Mirrors the corpus curriculum.
pub const CALCULUS_TOPICS: &[(&str, &[&str])] = &[
    (
        "Limits",
        &["Basic Limit Concept", "Limit Laws", "Continuity", "Infinite Limits"],
    ),
    (
        "Derivatives",
        &[
            "Definition of Derivative",
            "Derivative Rules",
            "Chain Rule",
            "Implicit Differentiation",
        ],
    ),
    (
        "Integration",
        &[
            "Antiderivatives",
            "Definite Integrals",
            "Substitution",
            "Integration by Parts",
        ],
    ),
    (
        "Applications",
        &[
            "Optimization",
            "Related Rates",
            "Area Between Curves",
            "Volume of Revolution",
        ],
    ),
    (
        "Series",
        &["Sequences", "Geometric Series", "Convergence Tests", "Power Series"],
    ),
];
