use super::logistic::binary_classes;
use crate::error::{InferenceError, Result};
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

/// One fitted decision tree in flattened array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise rows with
/// `x[feature[i]] <= threshold[i]` go to `children_left[i]`, the rest to
/// `children_right[i]`. `value[i]` holds per-class weights for the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(InferenceError::invalid("decision tree has no nodes"));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(InferenceError::invalid(
                "decision tree arrays have different lengths",
            ));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                let weights = &self.value[node];
                if weights.len() != n_classes {
                    return Err(InferenceError::invalid(format!(
                        "leaf {node} has {} class weights, expected {n_classes}",
                        weights.len()
                    )));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0)
                    || weights.iter().sum::<f64>() <= 0.0
                {
                    return Err(InferenceError::invalid(format!(
                        "leaf {node} has invalid class weights"
                    )));
                }
                continue;
            }

            // Children always come after their parent, which rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(InferenceError::invalid(format!(
                        "node {node} points to invalid child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(InferenceError::invalid(format!(
                    "node {node} splits on feature {feature}, model has {n_features}"
                )));
            }
        }
        Ok(())
    }

    fn leaf(&self, row: &[f64]) -> &[f64] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }

    /// Normalized class distribution of the leaf `row` lands in.
    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        let weights = self.leaf(row);
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

/// Fitted random forest classifier; probabilities are averaged over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    #[serde(default = "binary_classes")]
    pub classes: Vec<i64>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<()> {
        if self.classes.len() < 2 {
            return Err(InferenceError::invalid("random forest needs at least 2 classes"));
        }
        if self.n_features == 0 {
            return Err(InferenceError::invalid("random forest has zero features"));
        }
        if self.trees.is_empty() {
            return Err(InferenceError::invalid("random forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| InferenceError::invalid(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba_row(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    pub fn predict_row(&self, row: &[f64]) -> i64 {
        self.classes[argmax(&self.predict_proba_row(row))]
    }
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max {
                (i, v)
            } else {
                (best, max)
            }
        })
        .0
}
