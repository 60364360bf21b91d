use crate::error::Result;
use crate::types::FeatureFrame;

/// A fitted binary or multi-class classifier.
///
/// Implementations are immutable once loaded and may be called from any
/// worker thread.
pub trait Classifier: Send + Sync {
    /// One class label per row of `frame`.
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<i64>>;

    /// One probability row per row of `frame`, columns ordered by class.
    fn predict_proba(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>>;

    /// Short description of the model family, used in logs.
    fn kind(&self) -> &'static str;
}
