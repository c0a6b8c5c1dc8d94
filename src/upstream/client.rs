//! Outbound HTTP client bound to the configured upstream base URL.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, Request, Response, Uri},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::error::{describe, ProxyError};

/// Plain HTTP/1.1 client used for every upstream call.
pub type HttpClient = Client<HttpConnector, Body>;

/// The inference server every request is forwarded to.
#[derive(Clone)]
pub struct Upstream {
    base_url: String,
    client: HttpClient,
}

impl Upstream {
    /// Create an upstream handle. A trailing `/` on the base URL is dropped so
    /// that appending an inbound path never produces `//`.
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL as used in outbound URIs and error messages.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Outbound URI for an inbound path (query string included verbatim).
    pub fn target_uri(&self, path_and_query: &str) -> Result<Uri, ProxyError> {
        let target = format!("{}{}", self.base_url, path_and_query);
        target
            .parse::<Uri>()
            .map_err(|e| ProxyError::Internal(format!("invalid upstream URI {target}: {e}")))
    }

    /// Send one request upstream and return the response head with an unread body.
    ///
    /// A present `body` is sent with `Content-Type: application/json`.
    pub async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> Result<Response<Incoming>, ProxyError> {
        let uri = self.target_uri(path_and_query)?;
        tracing::debug!(method = %method, url = %uri, "Forwarding to upstream");

        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(bytes) => builder
                .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(Body::from(bytes)),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| ProxyError::Internal(format!("failed to build upstream request: {e}")))?;

        self.client
            .request(request)
            .await
            .map_err(|e| self.connection_error(describe(&e)))
    }

    /// Connection-class error naming this upstream.
    pub fn connection_error(&self, message: impl Into<String>) -> ProxyError {
        ProxyError::Connection {
            upstream: self.base_url.clone(),
            message: message.into(),
        }
    }
}
