//! Request identification for tracing.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every inbound request
//! - Open the per-request span that all proxy logs nest under
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer)
//! - The ID stays internal: it is neither forwarded upstream nor echoed back,
//!   so client-visible headers are exactly the relayed ones plus CORS

use axum::{
    body::Body,
    http::{HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header the request ID is stored under on the inbound request.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Span opened by the trace layer for each request.
pub fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}
