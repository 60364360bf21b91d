use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InferenceError>;

/// Everything that can go wrong while loading or running a classifier.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported model artifact {0}: expected a .json or .onnx file")]
    UnsupportedFormat(PathBuf),

    #[error("ONNX runtime error: {0}")]
    Onnx(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("X has {got} features, but {estimator} is expecting {expected} features as input")]
    FeatureCountMismatch {
        estimator: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("column not found in input: {0}")]
    MissingFeature(String),

    #[error("input frame has no rows")]
    EmptyFrame,

    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

impl InferenceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        InferenceError::InvalidModel(message.into())
    }
}
