#![allow(dead_code)]

use loan_backend::config::{LOGISTIC_REGRESSION, RANDOM_FOREST, STACKING};
use loan_backend::FEATURE_NAMES;
use loan_inferences::{Classifier, FeatureFrame, InferenceError, ModelSpec, ModelStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const SCENARIO: [(&str, &str); 5] = [
    ("Age", "35"),
    ("Annual_Income", "50000"),
    ("Credit_Score", "700"),
    ("Employment_Years", "5"),
    ("Loan_Amount_Requested", "10000"),
];

pub const RISKY: [(&str, &str); 5] = [
    ("Age", "22"),
    ("Annual_Income", "15000"),
    ("Credit_Score", "520"),
    ("Employment_Years", "0"),
    ("Loan_Amount_Requested", "40000"),
];

pub fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../models")
}

/// The three bundled artifacts, loaded the way the server loads them.
pub fn bundled_store() -> ModelStore {
    let dir = models_dir();
    let specs = [
        ModelSpec::new(LOGISTIC_REGRESSION, dir.join("pipeline_logistic.json")),
        ModelSpec::new(RANDOM_FOREST, dir.join("pipeline_random_forest.json")),
        ModelSpec::new(STACKING, dir.join("pipeline_stacking.json")),
    ];
    ModelStore::load(&specs, FEATURE_NAMES.len()).expect("bundled models load")
}

/// Returns a fixed answer and counts how often it is asked.
pub struct CountingClassifier {
    pub label: i64,
    pub probability: f64,
    pub calls: Arc<AtomicUsize>,
}

impl CountingClassifier {
    pub fn boxed(label: i64, probability: f64, calls: &Arc<AtomicUsize>) -> Box<Self> {
        Box::new(Self {
            label,
            probability,
            calls: calls.clone(),
        })
    }
}

impl Classifier for CountingClassifier {
    fn predict(&self, frame: &FeatureFrame) -> loan_inferences::Result<Vec<i64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.label; frame.rows().len()])
    }

    fn predict_proba(&self, frame: &FeatureFrame) -> loan_inferences::Result<Vec<Vec<f64>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![vec![1.0 - self.probability, self.probability]; frame.rows().len()])
    }

    fn kind(&self) -> &'static str {
        "Counting"
    }
}

/// Fails every call, like a model whose internal state does not match its input.
pub struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _frame: &FeatureFrame) -> loan_inferences::Result<Vec<i64>> {
        Err(InferenceError::FeatureCountMismatch {
            estimator: "LogisticRegression",
            expected: 4,
            got: 5,
        })
    }

    fn predict_proba(&self, frame: &FeatureFrame) -> loan_inferences::Result<Vec<Vec<f64>>> {
        self.predict(frame).map(|_| Vec::new())
    }

    fn kind(&self) -> &'static str {
        "Broken"
    }
}
