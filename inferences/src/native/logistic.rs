use crate::error::{InferenceError, Result};
use serde::{Deserialize, Serialize};

pub(crate) fn binary_classes() -> Vec<i64> {
    vec![0, 1]
}

/// Fitted binary logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default = "binary_classes")]
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<()> {
        if self.classes.len() != 2 {
            return Err(InferenceError::invalid(format!(
                "logistic regression supports exactly 2 classes, got {}",
                self.classes.len()
            )));
        }
        if self.coefficients.is_empty() {
            return Err(InferenceError::invalid("logistic regression has no coefficients"));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::invalid(
                "logistic regression has non-finite parameters",
            ));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        let p = sigmoid(self.decision_function(row));
        vec![1.0 - p, p]
    }

    pub fn predict_row(&self, row: &[f64]) -> i64 {
        if self.decision_function(row) > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
