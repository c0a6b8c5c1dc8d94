//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::ValidationError;

/// Port the proxy listens on.
pub const ENV_PORT: &str = "PROXY_PORT";
/// Base URL of the upstream inference server.
pub const ENV_UPSTREAM: &str = "OLLAMA_URL";
/// Default log level when `RUST_LOG` is unset.
pub const ENV_LOG_LEVEL: &str = "PROXY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error(
        "Validation failed: {}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    Validation(Vec<ValidationError>),
}

/// Load configuration from a TOML file. Missing sections fall back to defaults.
///
/// The result is not validated yet; environment and CLI overrides are applied
/// on top before [`crate::config::validate_config`] runs.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProxyConfig = toml::from_str(&content)?;
    Ok(config)
}

impl ProxyConfig {
    /// Overlay values found through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PORT) {
            self.listener.port = value.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_PORT,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_UPSTREAM) {
            self.upstream.base_url = value;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.observability.log_level = value;
        }
        Ok(())
    }
}
