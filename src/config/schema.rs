//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::{AddrParseError, IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host, port, backlog).
    pub listener: ListenerConfig,

    /// Inference server the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Accept backlog handed to `listen(2)`.
    pub backlog: u32,
}

impl ListenerConfig {
    /// Resolve host and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            backlog: 1024,
        }
    }
}

/// Upstream inference server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every inbound path is appended to (e.g., "http://localhost:11434").
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Limits applied to inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.port, 8000);
        assert_eq!(config.upstream.base_url, "http://localhost:11434");
        assert!(!config.observability.metrics_enabled);
        assert_eq!(
            config.listener.socket_addr().unwrap(),
            "0.0.0.0:8000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn ipv6_host_resolves() {
        let listener = ListenerConfig {
            host: "::1".into(),
            port: 9000,
            backlog: 16,
        };
        assert_eq!(listener.socket_addr().unwrap().to_string(), "[::1]:9000");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
[upstream]
base_url = "http://10.0.0.5:11434"
"#,
        )
        .unwrap();
        assert_eq!(config.upstream.base_url, "http://10.0.0.5:11434");
        assert_eq!(config.listener, ListenerConfig::default());
    }
}
