//! Server configuration: defaults, then an optional TOML file, then
//! `LOAN_API_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use loan_inferences::ModelSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/server.toml";
pub const CONFIG_PATH_VAR: &str = "LOAN_API_CONFIG";
pub const ENV_PREFIX: &str = "LOAN_API";

pub const LOGISTIC_REGRESSION: &str = "Logistic Regression";
pub const RANDOM_FOREST: &str = "Random Forest";
pub const STACKING: &str = "Stacking";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Directory the model file names below are resolved against.
    pub models_dir: PathBuf,
    pub logistic_model: String,
    pub random_forest_model: String,
    pub stacking_model: String,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl ServerConfig {
    /// Loads from `$LOAN_API_CONFIG` (or `config/server.toml` when unset) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Some(Path::new(&path)), Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads with an explicit file (optional if absent) and environment source.
    pub fn load_from(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080_i64)?
            .set_default("workers", num_cpus::get() as i64)?
            .set_default("models_dir", "models")?
            .set_default("logistic_model", "pipeline_logistic.json")?
            .set_default("random_forest_model", "pipeline_random_forest.json")?
            .set_default("stacking_model", "pipeline_stacking.json")?
            .set_default("log_level", "info")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        if config.workers == 0 {
            return Err(ConfigError::Message("workers must be at least 1".into()));
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The three served models, in response order.
    pub fn model_specs(&self) -> Vec<ModelSpec> {
        vec![
            ModelSpec::new(LOGISTIC_REGRESSION, self.models_dir.join(&self.logistic_model)),
            ModelSpec::new(RANDOM_FOREST, self.models_dir.join(&self.random_forest_model)),
            ModelSpec::new(STACKING, self.models_dir.join(&self.stacking_model)),
        ]
    }
}
