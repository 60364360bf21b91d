use crate::error::ApiError;
use crate::inference::predict_all;
use crate::models::{ErrorDetail, HealthResponse};
use crate::validation::{parse_application, BodyFormat};
use actix_web::http::header::ContentType;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use loan_inferences::ModelStore;
use std::time::Instant;

const PREDICT_PAGE: &str = include_str!("../static/predict.html");

/// Input form.
async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(PREDICT_PAGE)
}

async fn predict(
    store: web::Data<ModelStore>,
    request: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let format = BodyFormat::from_content_type(request.content_type());

    let application = parse_application(format, request.headers(), body)
        .await
        .inspect_err(|e| {
            warn!("Rejected prediction request: {}", e);
        })?;
    info!("Prediction request received: {:?}", application.to_array());

    // Model execution is CPU-bound; keep it off the async workers.
    let predictions = web::block(move || predict_all(&store, &application))
        .await
        .map_err(ApiError::from)
        .and_then(|result| result.map_err(ApiError::from))
        .inspect_err(|e| error!("Prediction failed: {}", e))?;

    info!(
        "Prediction served for {} models in {} ms",
        predictions.len(),
        start_time.elapsed().as_millis()
    );
    Ok(HttpResponse::Ok().json(predictions))
}

async fn health(store: web::Data<ModelStore>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models: store.names().into_iter().map(String::from).collect(),
    })
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ErrorDetail {
        detail: "Not Found".to_string(),
    })
}

/// Registers every route; the caller provides `web::Data<ModelStore>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/predict", web::post().to(predict))
        .route("/health", web::get().to(health))
        .default_service(web::route().to(not_found));
}
