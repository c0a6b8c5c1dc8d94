//! Ollama Forwarding Proxy Library
//!
//! Relays an Ollama server's REST API with permissive CORS headers and folds
//! the streamed `/api/generate` reply into a single JSON object.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
