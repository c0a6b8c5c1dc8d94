//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (request ID, per-request span)
//!     → routing (preflight / generate / pass-through / unsupported)
//!     → upstream relay or stream aggregator
//!     → cors.rs (stamp CORS headers on the response)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
