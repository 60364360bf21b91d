//! Model execution for the loan default service.
//!
//! Classifiers are loaded once from artifacts on disk, either JSON
//! pipelines run natively or ONNX graphs run with tract, and exposed
//! through the [`Classifier`] trait.

pub mod classifier;
pub mod error;
pub mod inference;
pub mod native;
pub mod store;
pub mod types;

pub use classifier::Classifier;
pub use error::{InferenceError, Result};
pub use inference::OnnxClassifier;
pub use native::{Estimator, Pipeline};
pub use store::{LoadError, ModelHandle, ModelSpec, ModelStore};
pub use types::FeatureFrame;
