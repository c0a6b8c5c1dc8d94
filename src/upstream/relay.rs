//! Verbatim request/response relay.
//!
//! # Responsibilities
//! - Forward one request upstream (no retries)
//! - Buffer the complete upstream body before answering
//! - Mirror status, `Content-Type` (default `application/json`) and body bytes
//!
//! CORS headers are not added here; the router-wide layer stamps them on
//! every response.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::{describe, ProxyError};
use crate::observability::logging::payload_preview;
use crate::upstream::client::Upstream;

/// A fully read upstream reply, ready to hand back to the client.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub body: Bytes,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Forward a request and read the whole reply.
pub async fn forward(
    upstream: &Upstream,
    method: Method,
    path_and_query: &str,
    body: Option<Bytes>,
) -> Result<UpstreamReply, ProxyError> {
    let response = upstream.send(method, path_and_query, body).await?;
    let (parts, incoming) = response.into_parts();

    let body = axum::body::to_bytes(Body::new(incoming), usize::MAX)
        .await
        .map_err(|e| upstream.connection_error(describe(&e)))?;

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    tracing::debug!(
        status = %parts.status,
        headers = ?parts.headers,
        bytes = body.len(),
        preview = %payload_preview(&body),
        "Upstream response"
    );

    Ok(UpstreamReply {
        status: parts.status,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reply_mirrors_status_type_and_body() {
        let reply = UpstreamReply {
            status: StatusCode::NOT_FOUND,
            content_type: HeaderValue::from_static("text/plain; charset=utf-8"),
            body: Bytes::from_static(b"404 page not found"),
        };
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"404 page not found");
    }
}
