//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path?query, body)
//!     → client.rs (rewrite host onto base URL, send once)
//!     → relay.rs (buffer reply, mirror status / content type / body)
//!     → UpstreamReply | ProxyError
//! ```
//!
//! # Design Decisions
//! - One attempt per request; failures surface as ProxyError::Connection
//! - No upstream timeout: a hung upstream holds only its own request
//! - Plain HTTP only (hyper-util legacy client over HttpConnector)

pub mod client;
pub mod relay;

pub use client::Upstream;
pub use relay::{forward, UpstreamReply};
