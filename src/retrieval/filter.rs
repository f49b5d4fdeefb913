//! Policy filtering of raw search hits.
//!
//! Hits arrive ranked by similarity; the filter walks them in that order,
//! resolves each against the corpus store, drops anything the policy
//! excludes, and stops once the policy's limit is filled. Coming up short is
//! fine, which is why callers over-fetch well past the limit.

use serde::Serialize;

use crate::corpus::{CorpusItem, CorpusStore};
use crate::retrieval::policy::RetrievalPolicy;
use crate::search::SearchHit;

/// A corpus item that survived filtering, with its similarity attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CorpusItem,
    pub score: f32,
}

/// Applies `policy` to `hits` in relevance order.
///
/// An item with an unknown layer or difficulty passes that axis: only a
/// known value outside a non-empty policy set rejects. Indices the corpus
/// cannot resolve (stale vector artifact against a newer corpus build) are
/// skipped and logged, never surfaced.
pub fn filter_hits(hits: &[SearchHit], policy: &RetrievalPolicy, corpus: &CorpusStore) -> Vec<ScoredItem> {
    let mut results = Vec::with_capacity(policy.limit);
    for hit in hits {
        let Some(item) = corpus.get(hit.index) else {
            tracing::debug!(index = hit.index, corpus_len = corpus.len(), "skipping stale search index");
            continue;
        };
        if item.layer.is_known() && !policy.allows_layer(item.layer) {
            continue;
        }
        if item.difficulty.is_known() && !policy.allows_difficulty(item.difficulty) {
            continue;
        }
        results.push(ScoredItem {
            item: item.clone(),
            score: hit.score,
        });
        if results.len() >= policy.limit {
            break;
        }
    }
    results
}
