use crate::classifier::Classifier;
use crate::error::{InferenceError, Result};
use crate::types::FeatureFrame;
use tract_onnx::prelude::*;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier exported to ONNX and run with tract.
///
/// The graph takes one `float32` input of shape `[1, n_features]` and
/// yields labels (`int64`) as output 0 and class probabilities
/// (`float32`, `[1, n_classes]`) as output 1. Exports that wrap the
/// probabilities in a ZipMap are not supported.
pub struct OnnxClassifier {
    model: OnnxPlan,
    n_features: usize,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<std::path::Path>>(model_path: P, n_features: usize) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.is_file() {
            return Err(InferenceError::Io {
                path: model_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        let proto = tract_onnx::onnx()
            .proto_model_for_path(model_path)
            .map_err(|e| InferenceError::Onnx(format!("{}: {e:#}", model_path.display())))?;
        Self::from_proto(&proto, n_features)
            .map_err(|e| InferenceError::Onnx(format!("{}: {e:#}", model_path.display())))
    }

    /// Builds the runnable plan from an already decoded ONNX model.
    pub fn from_proto(proto: &tract_onnx::pb::ModelProto, n_features: usize) -> TractResult<Self> {
        let model = tract_onnx::onnx()
            .model_for_proto_model(proto)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, n_features)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, n_features })
    }

    fn run_row(&self, row: &[f64]) -> Result<TVec<TValue>> {
        if row.len() != self.n_features {
            return Err(InferenceError::FeatureCountMismatch {
                estimator: "OnnxClassifier",
                expected: self.n_features,
                got: row.len(),
            });
        }
        let input: Vec<f32> = row.iter().map(|&x| x as f32).collect();
        let tensor = Tensor::from_shape(&[1, self.n_features], &input)
            .map_err(|e| InferenceError::Onnx(e.to_string()))?;
        self.model
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::Onnx(e.to_string()))
    }

    fn rows(frame: &FeatureFrame) -> Result<&[Vec<f64>]> {
        if frame.is_empty() {
            return Err(InferenceError::EmptyFrame);
        }
        Ok(frame.rows())
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<i64>> {
        Self::rows(frame)?
            .iter()
            .map(|row| {
                let outputs = self.run_row(row)?;
                let labels = outputs
                    .first()
                    .ok_or_else(|| InferenceError::MalformedOutput("no label output".into()))?;
                let view = labels
                    .to_array_view::<i64>()
                    .map_err(|e| InferenceError::MalformedOutput(e.to_string()))?;
                view.iter()
                    .next()
                    .copied()
                    .ok_or_else(|| InferenceError::MalformedOutput("empty label output".into()))
            })
            .collect()
    }

    fn predict_proba(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        Self::rows(frame)?
            .iter()
            .map(|row| {
                let outputs = self.run_row(row)?;
                let proba = outputs.get(1).ok_or_else(|| {
                    InferenceError::MalformedOutput("no probability output".into())
                })?;
                let view = proba
                    .to_array_view::<f32>()
                    .map_err(|e| InferenceError::MalformedOutput(e.to_string()))?;
                Ok(view.iter().map(|&p| p as f64).collect())
            })
            .collect()
    }

    fn kind(&self) -> &'static str {
        "OnnxClassifier"
    }
}
