//! Layered Configuration
//!
//! Built-in defaults, then an optional TOML file, then `CALMCAST__*`
//! environment variables (`CALMCAST__SERVER__ADDR=0.0.0.0:9000`).

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Config file used when `CALMCAST_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/calmcast.toml";

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Path of the ONNX stress classifier
    pub path: String,
    /// Load on the blocking pool after startup instead of before serving
    pub lazy: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx SQLite URL
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Load from the file named by `CALMCAST_CONFIG` (or the default path) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CALMCAST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Some(&path), true)
    }

    /// Load from an optional file, optionally overlaying the environment
    pub fn load_from(path: Option<&str>, with_env: bool) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.addr", "0.0.0.0:8000")?
            .set_default("model.path", "models/stress_model.onnx")?
            .set_default("model.lazy", false)?
            .set_default("database.url", "sqlite://calmcast.db?mode=rwc")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("rate_limit.per_second", 1_i64)?
            .set_default("rate_limit.burst_size", 10_i64)?
            .set_default(
                "cors.allowed_origins",
                vec!["http://localhost:3000", "http://127.0.0.1:3000"],
            )?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("CALMCAST")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            );
        }

        builder.build()?.try_deserialize()
    }
}
