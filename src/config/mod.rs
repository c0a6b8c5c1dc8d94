//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → PROXY_PORT / OLLAMA_URL / PROXY_LOG_LEVEL (loader.rs)
//!     → CLI flags (main.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; request handlers never read the environment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
