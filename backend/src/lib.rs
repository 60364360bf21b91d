//! HTTP service answering loan default predictions from three fitted models.

pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod routes;
pub mod validation;

pub use config::ServerConfig;
pub use error::ApiError;
pub use models::{LoanApplication, ModelPrediction, Predictions, FEATURE_NAMES};
