use std::sync::Arc;

use tracing::{debug, warn};

use crate::corpus::CorpusStore;
use crate::mastery::MasteryEngine;
use crate::search::{SearchHit, VectorIndex};
use crate::services::EmbeddingProvider;

use super::filter::{filter_hits, ScoredItem};
use super::intent::{Intent, IntentClassifier};
use super::policy::{PolicyResolver, RetrievalPolicy};

/// How many candidates to pull from the index per requested result. Policy
/// filtering discards wrong-layer and wrong-difficulty hits, so the raw pool
/// has to be deeper than the final limit.
pub const OVERFETCH_FACTOR: usize = 4;

/// Result of one adaptive retrieval pass.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub intent: Intent,
    pub policy: RetrievalPolicy,
    pub results: Vec<ScoredItem>,
}

/// Ties the pipeline together: classify the query, look up the learner,
/// resolve a policy, then search and filter the corpus.
pub struct RetrievalEngine {
    classifier: IntentClassifier,
    resolver: PolicyResolver,
    corpus: Arc<CorpusStore>,
    index: Arc<VectorIndex>,
    embedder: Arc<EmbeddingProvider>,
    mastery: Arc<MasteryEngine>,
}

impl RetrievalEngine {
    pub fn new(
        corpus: Arc<CorpusStore>,
        index: Arc<VectorIndex>,
        embedder: Arc<EmbeddingProvider>,
        mastery: Arc<MasteryEngine>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            resolver: PolicyResolver::new(),
            corpus,
            index,
            embedder,
            mastery,
        }
    }

    /// Runs the full adaptive pipeline for one query. An unreachable
    /// embedding backend degrades to an empty result list instead of an
    /// error so callers can still answer from general knowledge.
    pub async fn retrieve(&self, query: &str, user_id: Option<&str>) -> RetrievalOutcome {
        let intent = self.classifier.classify(query);
        let state = user_id
            .map(|id| self.mastery.learner_state(id))
            .unwrap_or_default();
        let policy = self.resolver.resolve(intent, &state);

        let hits = self.search_hits(query, policy.limit * OVERFETCH_FACTOR).await;
        let results = filter_hits(&hits, &policy, &self.corpus);

        debug!(
            intent = intent.as_str(),
            candidates = hits.len(),
            kept = results.len(),
            "Adaptive retrieval complete"
        );

        RetrievalOutcome {
            intent,
            policy,
            results,
        }
    }

    /// Plain semantic search with no policy shaping. Out-of-range index
    /// rows are skipped.
    pub async fn search_plain(&self, query: &str, limit: usize) -> Vec<ScoredItem> {
        let hits = self.search_hits(query, limit).await;
        hits.iter()
            .filter_map(|hit| {
                self.corpus.get(hit.index).map(|item| ScoredItem {
                    item: item.clone(),
                    score: hit.score,
                })
            })
            .collect()
    }

    async fn search_hits(&self, query: &str, k: usize) -> Vec<SearchHit> {
        match self.embedder.embed_text(query).await {
            Ok(vector) => self.index.search(&vector, k),
            Err(e) => {
                warn!(error = %e, "Query embedding failed, returning no hits");
                Vec::new()
            }
        }
    }
}
