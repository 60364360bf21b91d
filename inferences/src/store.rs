//! The fixed set of models served for the process lifetime.

use crate::classifier::Classifier;
use crate::error::{InferenceError, Result};
use crate::inference::OnnxClassifier;
use crate::native::Pipeline;
use log::{error, info};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where to find one named model artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub path: PathBuf,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A loaded, immutable classifier and the name it is served under.
pub struct ModelHandle {
    name: String,
    classifier: Box<dyn Classifier>,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            name: name.into(),
            classifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name)
            .field("kind", &self.classifier.kind())
            .finish()
    }
}

/// Error raised while building the store, naming the model that failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to load model '{name}': {source}")]
pub struct LoadError {
    pub name: String,
    #[source]
    pub source: InferenceError,
}

/// Read-only set of model handles, iterated in load order.
#[derive(Debug)]
pub struct ModelStore {
    handles: Vec<ModelHandle>,
}

impl ModelStore {
    /// Loads every artifact, failing on the first one that is missing or corrupt.
    pub fn load(specs: &[ModelSpec], n_features: usize) -> std::result::Result<Self, LoadError> {
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            info!("Loading model '{}' from {}", spec.name, spec.path.display());
            let classifier = load_classifier(&spec.path, n_features).map_err(|source| {
                error!("Model '{}' failed to load: {}", spec.name, source);
                LoadError {
                    name: spec.name.clone(),
                    source,
                }
            })?;
            info!("Model '{}' loaded ({})", spec.name, classifier.kind());
            handles.push(ModelHandle::new(spec.name.clone(), classifier));
        }
        Ok(Self { handles })
    }

    pub fn from_handles(handles: Vec<ModelHandle>) -> Self {
        Self { handles }
    }

    pub fn handles(&self) -> impl Iterator<Item = &ModelHandle> {
        self.handles.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(ModelHandle::name).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Picks the runtime from the artifact's extension.
pub fn load_classifier(path: &Path, n_features: usize) -> Result<Box<dyn Classifier>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Box::new(Pipeline::from_path(path)?)),
        Some("onnx") => Ok(Box::new(OnnxClassifier::load(path, n_features)?)),
        _ => Err(InferenceError::UnsupportedFormat(path.to_path_buf())),
    }
}
