//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (socket options, bind, listen)
//!     → tokio TcpListener handed to axum::serve
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
