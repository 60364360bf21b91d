//! Runs every served model on one application.

use crate::models::{LoanApplication, ModelPrediction, Predictions};
use log::debug;
use loan_inferences::{InferenceError, ModelHandle, ModelStore};

/// Predicts with each model in store order.
///
/// The first model that fails aborts the whole call; results from models
/// that already ran are dropped.
pub fn predict_all(
    store: &ModelStore,
    application: &LoanApplication,
) -> Result<Predictions, InferenceError> {
    let frame = application.to_frame();
    let mut predictions = Predictions::with_capacity(store.len());

    for handle in store.handles() {
        let prediction = predict_one(handle, &frame)?;
        debug!(
            "{}: label={} probability={:.4}",
            handle.name(),
            prediction.loan_default,
            prediction.probability_of_default
        );
        predictions.push(handle.name(), prediction);
    }

    Ok(predictions)
}

fn predict_one(
    handle: &ModelHandle,
    frame: &loan_inferences::FeatureFrame,
) -> Result<ModelPrediction, InferenceError> {
    let model = handle.classifier();
    let labels = model.predict(frame)?;
    let probabilities = model.predict_proba(frame)?;

    let loan_default = *labels.first().ok_or_else(|| {
        InferenceError::MalformedOutput(format!("{} returned no labels", handle.name()))
    })?;
    let row = probabilities.first().ok_or_else(|| {
        InferenceError::MalformedOutput(format!("{} returned no probabilities", handle.name()))
    })?;
    let probability_of_default = *row.get(1).ok_or_else(|| {
        InferenceError::MalformedOutput(format!(
            "{} returned {} class probabilities, expected at least 2",
            handle.name(),
            row.len()
        ))
    })?;
    if !(0.0..=1.0).contains(&probability_of_default) {
        return Err(InferenceError::MalformedOutput(format!(
            "{} returned probability {probability_of_default} outside [0, 1]",
            handle.name()
        )));
    }

    Ok(ModelPrediction {
        loan_default,
        probability_of_default,
    })
}
