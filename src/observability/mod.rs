//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, relay, aggregator produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Operator terminal / log shipper
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the per-request span
//! - Metrics are cheap (atomic increments) and off by default

pub mod logging;
pub mod metrics;
