//! Configuration management for Assetdesk

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which data source backs the services.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Bundled fixtures persisted in the key-value store
    Fixture,
    /// Remote REST backend described by [`ApiConfig`]
    Http,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub mode: DataMode,
    /// Directory holding one JSON document per storage key. In-memory when absent.
    pub storage_dir: Option<String>,
    pub seed_fixtures: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub enable_logging: bool,
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mock_mode = env::var("USE_MOCK_DATA")
            .ok()
            .map(|v| if v.trim() == "true" { "fixture" } else { "http" });

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // ASSETDESK__API__TIMEOUT_MS style variables
            .add_source(
                Environment::with_prefix("ASSETDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // Variables understood by the dashboard front-end
            .set_override_option("api.base_url", env::var("API_URL").ok())?
            .set_override_option("api.timeout_ms", env::var("API_TIMEOUT").ok())?
            .set_override_option("api.enable_logging", env::var("ENABLE_API_LOGGING").ok())?
            .set_override_option("data.mode", mock_mode)?
            .build()?;

        config.try_deserialize()
    }

    /// Whether every data operation runs against local fixtures.
    pub fn is_mock_mode(&self) -> bool {
        self.data.mode == DataMode::Fixture
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            mode: DataMode::Fixture,
            storage_dir: None,
            seed_fixtures: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 30_000,
            enable_logging: false,
            access_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
