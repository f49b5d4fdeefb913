//! Mastery prediction with model-or-heuristic dispatch.
//!
//! The mode is fixed once at startup: a loadable trained artifact gives
//! model mode, anything else gives the heuristic. Callers see one signature
//! either way, and every path lands in [0, 1].

use std::path::Path;

use crate::mastery::features;
use crate::mastery::model::MasteryModel;
use crate::mastery::types::FeatureVector;

const NEUTRAL_SCORE: f64 = 0.5;

const HEURISTIC_BASE: f64 = 0.5;
const HEURISTIC_CORRECT_BONUS: f64 = 0.3;
const HEURISTIC_ATTEMPT_PENALTY: f64 = 0.1;
const HEURISTIC_HINT_PENALTY: f64 = 0.1;

#[derive(Debug)]
pub enum MasteryPredictor {
    Model(MasteryModel),
    Heuristic,
}

impl MasteryPredictor {
    /// Loads the trained artifact when a path is configured and readable,
    /// otherwise settles on the heuristic for the process lifetime.
    pub fn from_artifact(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("no mastery model configured, using heuristic scoring");
            return Self::Heuristic;
        };
        match MasteryModel::load(path) {
            Ok(model) => Self::Model(model),
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "mastery model unavailable, using heuristic scoring");
                Self::Heuristic
            }
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Heuristic => "heuristic",
        }
    }

    /// Mastery estimate in [0, 1]. Inference failures degrade to the neutral
    /// score instead of surfacing.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        match self {
            Self::Model(model) => {
                // Project onto the artifact's column order; a name the engine
                // did not compute contributes 0, so schema drift between
                // training and serving degrades instead of erroring.
                let row: Vec<f64> = model
                    .feature_names()
                    .iter()
                    .map(|name| features.get(name).unwrap_or(0.0))
                    .collect();
                match model.predict_row(&row) {
                    Ok(raw) => clamp_unit(raw),
                    Err(err) => {
                        tracing::warn!(error = %err, "mastery inference failed, returning neutral score");
                        NEUTRAL_SCORE
                    }
                }
            }
            Self::Heuristic => {
                let correct = features.get(features::CORRECT).unwrap_or(0.0) >= 0.5;
                let attempts = features.get(features::ATTEMPT_COUNT).unwrap_or(1.0);
                let hints = features.get(features::HINT_COUNT).unwrap_or(0.0);

                let mut score = HEURISTIC_BASE;
                if correct {
                    score += HEURISTIC_CORRECT_BONUS;
                }
                score -= (attempts - 1.0) * HEURISTIC_ATTEMPT_PENALTY;
                score -= hints * HEURISTIC_HINT_PENALTY;
                clamp_unit(score)
            }
        }
    }
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        NEUTRAL_SCORE
    }
}
