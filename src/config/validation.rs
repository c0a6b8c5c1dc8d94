//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream base URL is something the plain HTTP client can reach
//! - Validate value ranges (body limit > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host {0:?} is not an IP address")]
    InvalidHost(String),

    #[error("upstream.base_url {url:?} is not a valid URL: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream.base_url {0:?} must use the http scheme")]
    UnsupportedScheme(String),

    #[error("upstream.base_url {0:?} has no host")]
    MissingUpstreamHost(String),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    let base_url = &config.upstream.base_url;
    match Url::parse(base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedScheme(base_url.clone()));
            }
            if url.host_str().map_or(true, str::is_empty) {
                errors.push(ValidationError::MissingUpstreamHost(base_url.clone()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
