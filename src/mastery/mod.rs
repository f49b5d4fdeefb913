#![allow(dead_code)]

pub mod engine;
pub mod features;
pub mod model;
pub mod predictor;
pub mod store;
pub mod types;

pub use engine::MasteryEngine;
pub use features::FeatureEngine;
pub use model::MasteryModel;
pub use predictor::MasteryPredictor;
pub use store::LearnerStore;
#[allow(unused_imports)]
pub use types::*;
