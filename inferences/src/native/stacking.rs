use super::Estimator;
use crate::error::{InferenceError, Result};
use serde::{Deserialize, Serialize};

/// Stacked ensemble: base estimators feed their positive-class
/// probabilities to a final estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stacking {
    pub estimators: Vec<Estimator>,
    pub final_estimator: Box<Estimator>,
    /// Append the raw input row to the meta-features.
    #[serde(default)]
    pub passthrough: bool,
}

impl Stacking {
    pub fn validate(&self) -> Result<()> {
        let first = self
            .estimators
            .first()
            .ok_or_else(|| InferenceError::invalid("stacking has no base estimators"))?;
        let n_features = first.n_features();

        for (i, estimator) in self.estimators.iter().enumerate() {
            estimator
                .validate()
                .map_err(|e| InferenceError::invalid(format!("base estimator {i}: {e}")))?;
            if estimator.classes().len() != 2 {
                return Err(InferenceError::invalid(format!(
                    "base estimator {i} is not binary"
                )));
            }
            if estimator.n_features() != n_features {
                return Err(InferenceError::invalid(format!(
                    "base estimator {i} expects {} features, estimator 0 expects {n_features}",
                    estimator.n_features()
                )));
            }
        }

        self.final_estimator
            .validate()
            .map_err(|e| InferenceError::invalid(format!("final estimator: {e}")))?;
        let meta_width = self.meta_width();
        if self.final_estimator.n_features() != meta_width {
            return Err(InferenceError::invalid(format!(
                "final estimator expects {} features, stacking produces {meta_width}",
                self.final_estimator.n_features()
            )));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.estimators.first().map_or(0, Estimator::n_features)
    }

    pub fn classes(&self) -> &[i64] {
        self.final_estimator.classes()
    }

    fn meta_width(&self) -> usize {
        self.estimators.len() + if self.passthrough { self.n_features() } else { 0 }
    }

    fn meta_features(&self, row: &[f64]) -> Result<Vec<f64>> {
        let mut meta = Vec::with_capacity(self.meta_width());
        for estimator in &self.estimators {
            meta.push(estimator.predict_proba_row(row)?[1]);
        }
        if self.passthrough {
            meta.extend_from_slice(row);
        }
        Ok(meta)
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.final_estimator
            .predict_proba_row(&self.meta_features(row)?)
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<i64> {
        self.final_estimator.predict_row(&self.meta_features(row)?)
    }
}
