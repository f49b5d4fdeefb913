//! Trained mastery regressor artifact.
//!
//! The model is trained offline and exported as JSON: the ordered feature
//! columns it expects plus a linear weight per column and an intercept.
//! Loading tolerates absence; the predictor runs its heuristic instead.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("model parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model has {weights} weights for {features} features")]
    Shape { weights: usize, features: usize },
    #[error("feature row has {got} values, model expects {expected}")]
    RowLength { expected: usize, got: usize },
}

/// Linear mastery regressor with named input columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl MasteryModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&raw)?;
        model.validate()?;
        tracing::info!(
            features = model.feature_names.len(),
            path = %path.display(),
            "mastery model loaded"
        );
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.weights.len() != self.feature_names.len() {
            return Err(ModelError::Shape {
                weights: self.weights.len(),
                features: self.feature_names.len(),
            });
        }
        Ok(())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw regression output for one feature row. Unclamped; range handling
    /// is the caller's concern.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.weights.len() {
            return Err(ModelError::RowLength {
                expected: self.weights.len(),
                got: row.len(),
            });
        }
        let output: f64 = self
            .weights
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        Ok(output)
    }
}
