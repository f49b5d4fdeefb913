//! Retrieval policy resolution.
//!
//! The single place adaptivity lives: each intent maps to the content layers
//! and difficulty bands worth searching, plus how many results to return.

use serde::{Deserialize, Serialize};

use crate::corpus::{ContentLayer, Difficulty};
use crate::mastery::types::LearnerState;
use crate::retrieval::intent::Intent;

/// Constraints one retrieval runs under. Empty `layers` or `difficulties`
/// means no restriction on that axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalPolicy {
    pub layers: Vec<ContentLayer>,
    pub difficulties: Vec<Difficulty>,
    pub limit: usize,
}

impl RetrievalPolicy {
    pub fn allows_layer(&self, layer: ContentLayer) -> bool {
        self.layers.is_empty() || self.layers.contains(&layer)
    }

    pub fn allows_difficulty(&self, difficulty: Difficulty) -> bool {
        self.difficulties.is_empty() || self.difficulties.contains(&difficulty)
    }
}

/// General study set: the policy used when no intent context exists.
impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            layers: vec![ContentLayer::Conceptual, ContentLayer::Procedural],
            difficulties: vec![Difficulty::Easy, Difficulty::Medium],
            limit: 6,
        }
    }
}

/// Maps (intent, learner state) to a retrieval policy from a fixed table.
///
/// Learner state is accepted but not yet consulted: mastery-driven tightening
/// (easier bands and conceptual layers on weak topics) plugs in here once
/// per-topic estimates carry enough signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyResolver;

impl PolicyResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, intent: Intent, _state: &LearnerState) -> RetrievalPolicy {
        use ContentLayer::{Conceptual, Procedural, Video};
        use Difficulty::{Easy, Hard, Medium};

        match intent {
            Intent::Procedural => RetrievalPolicy {
                layers: vec![Procedural],
                difficulties: vec![Medium, Hard],
                limit: 5,
            },
            Intent::Conceptual => RetrievalPolicy {
                layers: vec![Conceptual, Video],
                difficulties: vec![Easy, Medium],
                limit: 6,
            },
            Intent::Video => RetrievalPolicy {
                layers: vec![Video],
                difficulties: vec![Easy, Medium],
                limit: 4,
            },
            Intent::Mixed => RetrievalPolicy {
                layers: vec![Conceptual, Procedural, Video],
                difficulties: vec![Easy, Medium],
                limit: 8,
            },
        }
    }
}
