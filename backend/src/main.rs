use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{error, info};
use loan_backend::{routes, ServerConfig, FEATURE_NAMES};
use loan_inferences::ModelStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("failed to load configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting loan default prediction API");

    let store = match ModelStore::load(&config.model_specs(), FEATURE_NAMES.len()) {
        Ok(store) => {
            info!("Loaded {} models: {:?}", store.len(), store.names());
            store
        }
        Err(e) => {
            error!("Cannot start without every model: {}", e);
            return Err(e.into());
        }
    };
    let store = web::Data::new(store);

    let bind_address = config.bind_address();
    info!("Listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("   GET  /         - prediction form");
    info!("   POST /predict  - predict from form or JSON fields");
    info!("   GET  /health   - liveness and loaded models");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(store.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {bind_address}"))?
    .run()
    .await?;

    Ok(())
}
