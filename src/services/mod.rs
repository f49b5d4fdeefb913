#![allow(dead_code)]

pub mod embedding_provider;
pub mod llm_provider;
pub mod prompts;
pub mod quiz_cache;

pub use embedding_provider::EmbeddingProvider;
pub use llm_provider::LlmProvider;
pub use quiz_cache::QuizCache;
