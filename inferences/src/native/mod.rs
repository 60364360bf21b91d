//! Fitted pipelines stored as JSON and executed in-process.
//!
//! An artifact is an optional standard-scaling step followed by one
//! estimator. Estimators are tagged by `kind`:
//!
//! ```json
//! {
//!   "features": ["Age", "Annual_Income"],
//!   "scaler": {"mean": [40.0, 60000.0], "scale": [12.0, 25000.0]},
//!   "estimator": {"kind": "logistic_regression", "coefficients": [0.3, -0.8], "intercept": -1.1}
//! }
//! ```

mod forest;
mod logistic;
mod stacking;

pub use forest::{DecisionTree, RandomForest};
pub use logistic::LogisticRegression;
pub use stacking::Stacking;

use crate::classifier::Classifier;
use crate::error::{InferenceError, Result};
use crate::types::FeatureFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    Stacking(Stacking),
}

impl Estimator {
    pub fn name(&self) -> &'static str {
        match self {
            Estimator::LogisticRegression(_) => "LogisticRegression",
            Estimator::RandomForest(_) => "RandomForestClassifier",
            Estimator::Stacking(_) => "StackingClassifier",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Estimator::LogisticRegression(m) => m.validate(),
            Estimator::RandomForest(m) => m.validate(),
            Estimator::Stacking(m) => m.validate(),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Estimator::LogisticRegression(m) => m.n_features(),
            Estimator::RandomForest(m) => m.n_features,
            Estimator::Stacking(m) => m.n_features(),
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Estimator::LogisticRegression(m) => &m.classes,
            Estimator::RandomForest(m) => &m.classes,
            Estimator::Stacking(m) => m.classes(),
        }
    }

    fn check_width(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_features() {
            return Err(InferenceError::FeatureCountMismatch {
                estimator: self.name(),
                expected: self.n_features(),
                got: row.len(),
            });
        }
        Ok(())
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row)?;
        match self {
            Estimator::LogisticRegression(m) => Ok(m.predict_proba_row(row)),
            Estimator::RandomForest(m) => Ok(m.predict_proba_row(row)),
            Estimator::Stacking(m) => m.predict_proba_row(row),
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<i64> {
        self.check_width(row)?;
        match self {
            Estimator::LogisticRegression(m) => Ok(m.predict_row(row)),
            Estimator::RandomForest(m) => Ok(m.predict_row(row)),
            Estimator::Stacking(m) => m.predict_row(row),
        }
    }
}

/// Standardization step: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(InferenceError::invalid(format!(
                "scaler has {} means and {} scales for {n_features} features",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(InferenceError::invalid("scaler has a zero or non-finite scale"));
        }
        Ok(())
    }

    fn transform(&self, row: &mut [f64]) {
        for ((x, mean), scale) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - mean) / scale;
        }
    }
}

/// A fitted pipeline loaded from a JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Column names the pipeline was fitted on, in order. Without them the
    /// input is taken positionally.
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub estimator: Estimator,
}

impl Pipeline {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| InferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pipeline: Pipeline =
            serde_json::from_str(&raw).map_err(|source| InferenceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        pipeline.validated()
    }

    /// Checks the structure once so that prediction never indexes out of bounds.
    pub fn validated(self) -> Result<Self> {
        self.estimator.validate()?;
        let n_features = self.estimator.n_features();
        if let Some(features) = &self.features {
            if features.len() != n_features {
                return Err(InferenceError::invalid(format!(
                    "pipeline lists {} features, estimator expects {n_features}",
                    features.len()
                )));
            }
        }
        if let Some(scaler) = &self.scaler {
            scaler.validate(n_features)?;
        }
        Ok(self)
    }

    fn prepare(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        if frame.is_empty() {
            return Err(InferenceError::EmptyFrame);
        }
        let mut rows = match &self.features {
            Some(features) => frame.select(features)?,
            None => frame.rows().to_vec(),
        };
        if let Some(scaler) = &self.scaler {
            for row in &mut rows {
                self.estimator.check_width(row)?;
                scaler.transform(row);
            }
        }
        Ok(rows)
    }
}

impl Classifier for Pipeline {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<i64>> {
        self.prepare(frame)?
            .iter()
            .map(|row| self.estimator.predict_row(row))
            .collect()
    }

    fn predict_proba(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        self.prepare(frame)?
            .iter()
            .map(|row| self.estimator.predict_proba_row(row))
            .collect()
    }

    fn kind(&self) -> &'static str {
        self.estimator.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline(value: serde_json::Value) -> Result<Pipeline> {
        serde_json::from_value::<Pipeline>(value)
            .expect("artifact should deserialize")
            .validated()
    }

    fn logistic() -> serde_json::Value {
        json!({
            "features": ["a", "b"],
            "scaler": {"mean": [10.0, 0.0], "scale": [2.0, 1.0]},
            "estimator": {"kind": "logistic_regression", "coefficients": [1.0, 1.0], "intercept": 0.0}
        })
    }

    #[test]
    fn scales_and_selects_by_name() {
        let p = pipeline(logistic()).unwrap();
        // Columns arrive in a different order than fitted.
        let frame = FeatureFrame::single_row([("b", 0.0), ("a", 14.0)]);
        let proba = p.predict_proba(&frame).unwrap();
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((proba[0][1] - expected).abs() < 1e-12);
        assert_eq!(p.predict(&frame).unwrap(), vec![1]);
    }

    #[test]
    fn missing_column_fails_prediction() {
        let p = pipeline(logistic()).unwrap();
        let frame = FeatureFrame::single_row([("a", 1.0), ("c", 2.0)]);
        let err = p.predict(&frame).unwrap_err();
        assert!(matches!(err, InferenceError::MissingFeature(name) if name == "b"));
    }

    #[test]
    fn positional_pipeline_checks_width() {
        let p = pipeline(json!({
            "estimator": {"kind": "logistic_regression", "coefficients": [1.0, 1.0, 1.0], "intercept": 0.0}
        }))
        .unwrap();
        let frame = FeatureFrame::single_row([("a", 1.0), ("b", 2.0)]);
        let err = p.predict_proba(&frame).unwrap_err();
        assert_eq!(
            err.to_string(),
            "X has 2 features, but LogisticRegression is expecting 3 features as input"
        );
    }

    #[test]
    fn empty_frame_is_rejected() {
        let p = pipeline(logistic()).unwrap();
        let frame = FeatureFrame::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        assert!(matches!(p.predict(&frame), Err(InferenceError::EmptyFrame)));
    }

    #[test]
    fn feature_list_must_match_estimator() {
        let result = pipeline(json!({
            "features": ["a"],
            "estimator": {"kind": "logistic_regression", "coefficients": [1.0, 1.0], "intercept": 0.0}
        }));
        assert!(matches!(result, Err(InferenceError::InvalidModel(_))));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let result = pipeline(json!({
            "scaler": {"mean": [0.0], "scale": [0.0]},
            "estimator": {"kind": "logistic_regression", "coefficients": [1.0], "intercept": 0.0}
        }));
        assert!(result.is_err());
    }

    fn stacking() -> serde_json::Value {
        json!({
            "features": ["x"],
            "estimator": {
                "kind": "stacking",
                "estimators": [
                    {"kind": "logistic_regression", "coefficients": [1.0], "intercept": 0.0},
                    {
                        "kind": "random_forest",
                        "n_features": 1,
                        "trees": [{
                            "children_left": [1, -1, -1],
                            "children_right": [2, -1, -1],
                            "feature": [0, -2, -2],
                            "threshold": [0.0, -2.0, -2.0],
                            "value": [[1.0, 1.0], [3.0, 1.0], [1.0, 3.0]]
                        }]
                    }
                ],
                "final_estimator": {"kind": "logistic_regression", "coefficients": [2.0, 2.0], "intercept": -2.0}
            }
        })
    }

    #[test]
    fn stacking_feeds_positive_probabilities_to_final_estimator() {
        let p = pipeline(stacking()).unwrap();
        let frame = FeatureFrame::single_row([("x", 0.0)]);
        // Base outputs: sigmoid(0) = 0.5 and forest left leaf 0.25.
        let decision: f64 = 2.0 * 0.5 + 2.0 * 0.25 - 2.0;
        let expected = 1.0 / (1.0 + (-decision).exp());
        let proba = p.predict_proba(&frame).unwrap();
        assert!((proba[0][1] - expected).abs() < 1e-12);
        assert_eq!(p.predict(&frame).unwrap(), vec![0]);
        assert_eq!(p.kind(), "StackingClassifier");
    }

    #[test]
    fn stacking_passthrough_widens_final_input() {
        let mut artifact = stacking();
        artifact["estimator"]["passthrough"] = json!(true);
        // Final estimator still expects two meta-features, so this must fail.
        assert!(pipeline(artifact.clone()).is_err());

        artifact["estimator"]["final_estimator"]["coefficients"] = json!([2.0, 2.0, 0.5]);
        let p = pipeline(artifact).unwrap();
        let frame = FeatureFrame::single_row([("x", 4.0)]);
        let proba = p.predict_proba(&frame).unwrap();
        assert!(proba[0][1] > 0.5);
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let value = json!({"estimator": {"kind": "svm"}});
        assert!(serde_json::from_value::<Pipeline>(value).is_err());
    }

    #[test]
    fn from_path_reports_io_and_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Pipeline::from_path(&missing),
            Err(InferenceError::Io { .. })
        ));

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert!(matches!(
            Pipeline::from_path(&corrupt),
            Err(InferenceError::Parse { .. })
        ));

        let good = dir.path().join("good.json");
        std::fs::write(&good, logistic().to_string()).unwrap();
        assert!(Pipeline::from_path(&good).is_ok());
    }
}
