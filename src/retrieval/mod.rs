#![allow(dead_code)]

pub mod engine;
pub mod filter;
pub mod intent;
pub mod policy;

pub use engine::{RetrievalEngine, RetrievalOutcome};
pub use filter::ScoredItem;
pub use intent::{Intent, IntentClassifier};
pub use policy::{PolicyResolver, RetrievalPolicy};
