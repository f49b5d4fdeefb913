use std::sync::Arc;

use classmate_backend::config::Config;
use classmate_backend::corpus::CorpusStore;
use classmate_backend::create_app;
use classmate_backend::logging;
use classmate_backend::mastery::{MasteryEngine, MasteryPredictor};
use classmate_backend::retrieval::RetrievalEngine;
use classmate_backend::search::VectorIndex;
use classmate_backend::services::embedding_provider::EmbeddingProvider;
use classmate_backend::services::llm_provider::LlmProvider;
use classmate_backend::services::QuizCache;
use classmate_backend::state::AppState;
use classmate_backend::workers;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = logging::init_tracing(&config.log_level);

    let corpus = Arc::new(match CorpusStore::load(&config.corpus_path) {
        Ok(store) => {
            tracing::info!(items = store.len(), path = %config.corpus_path.display(), "Corpus loaded");
            store
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %config.corpus_path.display(), "Corpus not loaded, topic browsing is degraded");
            CorpusStore::from_items(Vec::new())
        }
    });

    let index = Arc::new(match VectorIndex::load(&config.index_path) {
        Ok(index) => {
            tracing::info!(vectors = index.len(), dim = index.dim(), "Vector index loaded");
            index
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %config.index_path.display(), "Vector index not loaded, search is disabled");
            VectorIndex::from_vectors(0, Vec::new())
        }
    });

    let predictor = MasteryPredictor::from_artifact(Some(&config.model_path));
    tracing::info!(mode = predictor.mode(), "Mastery predictor ready");

    let embedder = Arc::new(EmbeddingProvider::from_env());
    let llm = Arc::new(LlmProvider::from_env());
    let mastery = Arc::new(MasteryEngine::new(predictor));

    let retrieval = Arc::new(RetrievalEngine::new(
        Arc::clone(&corpus),
        Arc::clone(&index),
        Arc::clone(&embedder),
        Arc::clone(&mastery),
    ));

    let quiz_cache = Arc::new(QuizCache::load(&config.quiz_cache_path).await);

    let state = AppState::new(corpus, index, embedder, llm, mastery, retrieval, quiz_cache);

    if config.prewarm_quizzes {
        workers::spawn_quiz_prewarm(state.clone());
    }

    let app = create_app(state);

    let addr = config.bind_addr();
    tracing::info!(%addr, "classmate-backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
