//! Query intent classification.
//!
//! A learner's question is bucketed into a coarse intent before retrieval so
//! the policy layer can pick which content layers to search. Classification
//! is an ordered keyword rule table; the first rule with any keyword hit
//! wins, and a query matching no rule is treated as mixed.

use serde::{Deserialize, Serialize};

/// Coarse query intent driving retrieval policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Intent {
    Procedural,
    Conceptual,
    Video,
    #[default]
    Mixed,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Procedural => "procedural",
            Self::Conceptual => "conceptual",
            Self::Video => "video",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "procedural" => Self::Procedural,
            "conceptual" => Self::Conceptual,
            "video" => Self::Video,
            _ => Self::Mixed,
        }
    }
}

/// One classification rule: a query containing any of `keywords` (after
/// lowercasing) gets `intent`.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

/// Rule priority is positional: procedural phrasing outranks conceptual,
/// which outranks video cues. "solve the graph problem" is procedural.
pub const DEFAULT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Procedural,
        keywords: &["solve", "find", "calculate", "compute"],
    },
    IntentRule {
        intent: Intent::Conceptual,
        keywords: &["what is", "define", "meaning", "explain"],
    },
    IntentRule {
        intent: Intent::Video,
        keywords: &["visual", "graph", "video", "watch"],
    },
];

/// Deterministic keyword classifier over an ordered rule table.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: &'static [IntentRule],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }

    pub fn with_rules(rules: &'static [IntentRule]) -> Self {
        Self { rules }
    }

    /// Total over any input string; empty queries classify as mixed.
    pub fn classify(&self, query: &str) -> Intent {
        let q = query.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| q.contains(kw)))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Mixed)
    }
}
