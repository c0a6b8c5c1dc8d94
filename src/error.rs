//! Proxy outcome errors and their mapping onto HTTP responses.
//!
//! The relay and the aggregator return `Result<_, ProxyError>`; only the
//! [`IntoResponse`] impl here decides status codes and error bodies.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a proxied request could not produce an upstream reply.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// DNS, connect, reset, body read failure, or a failed generation call.
    #[error("Error connecting to {upstream}: {message}")]
    Connection { upstream: String, message: String },

    /// Anything else that went wrong while handling the request.
    #[error("Unexpected error: {0}")]
    Internal(String),

    #[error("Unsupported method ('{0}')")]
    UnsupportedMethod(Method),
}

impl ProxyError {
    /// Status code sent to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Connection { .. } | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

/// JSON body of every proxy-originated error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Render an error together with its `source()` chain, outermost first.
///
/// hyper's client errors carry the interesting part ("Connection refused")
/// in the source chain rather than in their own `Display`.
pub fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
