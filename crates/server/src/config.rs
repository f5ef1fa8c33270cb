//! # Application Configuration
//!
//! Defines the configuration structure for `mali-server` and loads it from
//! a YAML file layered under environment variables, so deployments can tune
//! thresholds, models, and endpoints without code changes.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use mali::{EmbeddingConfig, ResolverConfig};
use serde::Deserialize;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Configuration for the text embedding collaborator.
    pub embedding: EmbeddingConfig,
    /// Configuration for the generative fallback collaborator.
    pub generation: GenerationConfig,
    /// Pipeline policy: thresholds, reply word bound, corpus category.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Configuration for the Ollama-compatible generation endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    8090
}

fn default_db_url() -> String {
    "db/mali.db".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    60
}

/// Loads the application configuration from a file and environment
/// variables.
///
/// Top-level keys like `port` and `db_url` are overridden by `PORT` and
/// `DB_URL`; nested keys by `MALI_...` variables (e.g.
/// `MALI_EMBEDDING__API_URL`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let config_path = config_path_override.unwrap_or("config.yml");

    let mut builder = ConfigBuilder::builder();
    if std::path::Path::new(config_path).exists() {
        info!("Loading configuration from '{config_path}'.");
        builder = builder.add_source(File::new(config_path, FileFormat::Yaml));
    }

    let settings = builder
        // Top-level environment keys like PORT and DB_URL.
        .add_source(Environment::default())
        // Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("MALI")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize().map_err(Into::into)
}
