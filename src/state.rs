use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::corpus::CorpusStore;
use crate::mastery::MasteryEngine;
use crate::retrieval::RetrievalEngine;
use crate::search::VectorIndex;
use crate::services::{EmbeddingProvider, LlmProvider, QuizCache};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    corpus: Arc<CorpusStore>,
    index: Arc<VectorIndex>,
    embedder: Arc<EmbeddingProvider>,
    llm: Arc<LlmProvider>,
    mastery: Arc<MasteryEngine>,
    retrieval: Arc<RetrievalEngine>,
    quiz_cache: Arc<QuizCache>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        corpus: Arc<CorpusStore>,
        index: Arc<VectorIndex>,
        embedder: Arc<EmbeddingProvider>,
        llm: Arc<LlmProvider>,
        mastery: Arc<MasteryEngine>,
        retrieval: Arc<RetrievalEngine>,
        quiz_cache: Arc<QuizCache>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            corpus,
            index,
            embedder,
            llm,
            mastery,
            retrieval,
            quiz_cache,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn corpus(&self) -> Arc<CorpusStore> {
        Arc::clone(&self.corpus)
    }

    pub fn index(&self) -> Arc<VectorIndex> {
        Arc::clone(&self.index)
    }

    pub fn embedder(&self) -> Arc<EmbeddingProvider> {
        Arc::clone(&self.embedder)
    }

    pub fn llm(&self) -> Arc<LlmProvider> {
        Arc::clone(&self.llm)
    }

    pub fn mastery(&self) -> Arc<MasteryEngine> {
        Arc::clone(&self.mastery)
    }

    pub fn retrieval(&self) -> Arc<RetrievalEngine> {
        Arc::clone(&self.retrieval)
    }

    pub fn quiz_cache(&self) -> Arc<QuizCache> {
        Arc::clone(&self.quiz_cache)
    }
}
