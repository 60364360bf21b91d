use crate::models::{ErrorDetail, FieldError, ValidationDetail};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use loan_inferences::InferenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is missing fields or carries non-integer values.
    #[error("request validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A model raised while predicting; partial results are discarded.
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("prediction task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => {
                HttpResponse::build(self.status_code()).json(ValidationDetail {
                    detail: errors.clone(),
                })
            }
            _ => HttpResponse::build(self.status_code()).json(ErrorDetail {
                detail: self.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_maps_to_422_with_field_detail() {
        let err = ApiError::Validation(vec![FieldError::field(
            "Age",
            "missing",
            "Field required",
            serde_json::Value::Null,
        )]);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"][0]["loc"], serde_json::json!(["body", "Age"]));
        assert_eq!(json["detail"][0]["type"], "missing");
    }

    #[actix_web::test]
    async fn inference_maps_to_500_with_message() {
        let err = ApiError::from(InferenceError::MissingFeature("Age".into()));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "column not found in input: Age"}));
    }
}
