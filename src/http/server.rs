//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, CORS headers)
//! - Classify each request and dispatch it to the relay or the aggregator
//! - Map outcomes to responses and record per-request metrics
//! - Serve until the shutdown signal fires, draining in-flight requests

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{request_id::SetRequestIdLayer, trace::TraceLayer};

use crate::aggregate;
use crate::config::ProxyConfig;
use crate::error::{describe, ProxyError};
use crate::http::cors;
use crate::http::request::{request_span, MakeRequestUuid};
use crate::observability::logging::payload_preview;
use crate::observability::metrics;
use crate::routing::Route;
use crate::upstream::{self, Upstream};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Upstream,
    pub max_body_bytes: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState {
            upstream: Upstream::new(&config.upstream),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(request_span)),
            );
        cors::with_cors(router)
    }

    /// The fully layered router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on the given listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every method on every path lands here.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let route = Route::classify(&method, &path_and_query);
    tracing::info!(route = route.name(), uri = %path_and_query, "Request received");

    let response = match route {
        Route::Preflight => StatusCode::OK.into_response(),
        Route::Unsupported => {
            tracing::warn!(method = %method, "Unsupported method");
            ProxyError::UnsupportedMethod(method.clone()).into_response()
        }
        Route::Generate | Route::PassThrough => {
            relay(&state, route, method.clone(), &path_and_query, request.into_body()).await
        }
    };

    metrics::record_request(method.as_str(), route.name(), response.status().as_u16(), start);
    response
}

/// Buffer the inbound body, hand the request to the aggregator or the relay,
/// and turn any failure into a logged JSON error.
async fn relay(
    state: &AppState,
    route: Route,
    method: Method,
    path_and_query: &str,
    body: Body,
) -> Response {
    let payload = if method == Method::POST {
        match read_payload(body, state.max_body_bytes).await {
            Ok(bytes) => Some(bytes),
            Err(err) => return failure(err, path_and_query, None),
        }
    } else {
        None
    };

    if let Some(bytes) = &payload {
        tracing::debug!(bytes = bytes.len(), preview = %payload_preview(bytes), "Request payload");
    }

    let outcome = match route {
        Route::Generate => {
            let body = payload.clone().unwrap_or_default();
            aggregate::aggregate_generate(&state.upstream, path_and_query, body)
                .await
                .map(|result| Json(result).into_response())
        }
        _ => upstream::forward(&state.upstream, method, path_and_query, payload.clone())
            .await
            .map(IntoResponse::into_response),
    };

    outcome.unwrap_or_else(|err| failure(err, path_and_query, payload.as_deref()))
}

async fn read_payload(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::Internal(format!("failed to read request body: {}", describe(&e))))
}

fn failure(err: ProxyError, path_and_query: &str, payload: Option<&[u8]>) -> Response {
    tracing::error!(
        error = ?err,
        uri = %path_and_query,
        payload = %payload.map(payload_preview).unwrap_or_default(),
        "Request failed"
    );
    err.into_response()
}
