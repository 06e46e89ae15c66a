use axum::http::HeaderValue;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid allowed_origin '{0}'")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Origin allowed to reach the API and the push channel. `*` disables
    /// the origin check.
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origin: default_origin(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_origin() -> String {
    "*".to_string()
}

#[derive(Debug, Clone)]
pub enum AllowedOrigin {
    Any,
    Exact(HeaderValue),
}

impl ServerConfig {
    /// Resolve `allowed_origin` before the server starts; a value that is
    /// not `*` and not a valid origin header is a config error, never a
    /// silent fallback to any-origin.
    pub fn parse_allowed_origin(&self) -> Result<AllowedOrigin, ConfigError> {
        if self.allowed_origin == "*" {
            return Ok(AllowedOrigin::Any);
        }
        self.allowed_origin
            .parse::<HeaderValue>()
            .map(AllowedOrigin::Exact)
            .map_err(|_| ConfigError::InvalidOrigin(self.allowed_origin.clone()))
    }
}

/// Seed values for the tracker record before the device first reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            device_id: "Train-102".to_string(),
            latitude: 23.8103,
            longitude: 90.4125,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
