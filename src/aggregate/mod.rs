//! Stream aggregation for the generation endpoint.
//!
//! # Data Flow
//! ```text
//! POST /api/generate (buffered body)
//!     → OPENING   upstream::Upstream::send
//!     → READING   body frames → ndjson.rs (records) → accumulator.rs
//!     → COMPLETED AggregateResult (done = true)
//!   or FAILED     ProxyError::Connection (no partial aggregate)
//! ```
//!
//! # Design Decisions
//! - Malformed records are logged and skipped, never fatal
//! - `done: true` does not end the read loop; only end of body does
//! - A non-success upstream status fails the call instead of aggregating
//!   an error document into an empty result

pub mod accumulator;
pub mod chunk;
pub mod ndjson;

use axum::{
    body::{Body, Bytes},
    http::Method,
};
use futures_util::StreamExt;

use crate::error::{describe, ProxyError};
use crate::observability::logging::payload_preview;
use crate::observability::metrics;
use crate::upstream::Upstream;

pub use accumulator::{GenerateAccumulator, RecordOutcome};
pub use chunk::{AggregateResult, StreamedChunk};
pub use ndjson::LineSplitter;

/// Forward a generation request and fold its streamed reply into one result.
pub async fn aggregate_generate(
    upstream: &Upstream,
    path_and_query: &str,
    body: Bytes,
) -> Result<AggregateResult, ProxyError> {
    let response = upstream.send(Method::POST, path_and_query, Some(body)).await?;

    let status = response.status();
    if !status.is_success() {
        let detail = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX)
            .await
            .map(|bytes| payload_preview(&bytes))
            .unwrap_or_default();
        tracing::warn!(status = %status, body = %detail, "Generation rejected by upstream");
        return Err(upstream.connection_error(format!("upstream returned {status}")));
    }

    let mut frames = Body::new(response.into_body()).into_data_stream();
    let mut splitter = LineSplitter::new();
    let mut acc = GenerateAccumulator::new();

    while let Some(frame) = frames.next().await {
        let frame = frame.map_err(|e| upstream.connection_error(describe(&e)))?;
        for record in splitter.push(&frame) {
            ingest(&mut acc, &record);
        }
    }
    if let Some(tail) = splitter.finish() {
        ingest(&mut acc, &tail);
    }

    if !acc.done_seen() {
        tracing::warn!(records = acc.records(), "Generation stream ended without a done record");
    }
    tracing::info!(
        records = acc.records(),
        malformed = acc.malformed(),
        response_len = acc.response_len(),
        "Generation aggregated"
    );

    Ok(acc.finish())
}

fn ingest(acc: &mut GenerateAccumulator, record: &[u8]) {
    match acc.ingest(record) {
        RecordOutcome::Applied => metrics::record_stream_record(false),
        RecordOutcome::Malformed => metrics::record_stream_record(true),
        RecordOutcome::Blank => {}
    }
}
