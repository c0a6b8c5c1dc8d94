//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (stderr, env-filtered)
//! - Provide truncated payload previews for diagnostics
//!
//! # Design Decisions
//! - `RUST_LOG` wins; otherwise the configured level applies to this crate and tower_http
//! - Payloads are never logged in full

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Number of payload bytes included in log previews.
pub const PREVIEW_BYTES: usize = 100;

/// Initialize the global tracing subscriber.
pub fn init(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn default_filter(config: &ObservabilityConfig) -> String {
    format!(
        "ollama_proxy={level},tower_http={level}",
        level = config.log_level
    )
}

/// First [`PREVIEW_BYTES`] bytes of a payload, lossily decoded.
pub fn payload_preview(bytes: &[u8]) -> String {
    let end = bytes.len().min(PREVIEW_BYTES);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
