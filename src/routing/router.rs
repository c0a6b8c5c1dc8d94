//! Route classification.
//!
//! # Design Decisions
//! - Decided on method and request target only; headers never affect routing
//! - The generation target is an exact literal: no prefix, pattern, or
//!   query-string variant aggregates

use axum::http::Method;

/// Path whose streamed reply is aggregated into a single object.
pub const GENERATE_PATH: &str = "/api/generate";

/// How an inbound request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// CORS preflight, answered locally.
    Preflight,
    /// `POST` to [`GENERATE_PATH`], aggregated by the stream aggregator.
    Generate,
    /// Any other `GET`/`POST`, relayed verbatim.
    PassThrough,
    /// Any other method, rejected locally.
    Unsupported,
}

impl Route {
    /// Classify a request by method and path-and-query.
    pub fn classify(method: &Method, path_and_query: &str) -> Self {
        if *method == Method::OPTIONS {
            Route::Preflight
        } else if *method == Method::POST && path_and_query == GENERATE_PATH {
            Route::Generate
        } else if *method == Method::GET || *method == Method::POST {
            Route::PassThrough
        } else {
            Route::Unsupported
        }
    }

    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::Generate => "generate",
            Route::PassThrough => "passthrough",
            Route::Unsupported => "unsupported",
        }
    }
}
