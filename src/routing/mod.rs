//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (Route::classify)
//!     → Preflight   → 200, CORS headers only
//!     → Generate    → aggregate::aggregate_generate
//!     → PassThrough → upstream::relay::forward
//!     → Unsupported → 501
//! ```
//!
//! # Design Decisions
//! - No route table: the proxy mirrors the upstream's whole REST surface
//! - Deterministic: same input always yields the same route

pub mod router;

pub use router::{Route, GENERATE_PATH};
