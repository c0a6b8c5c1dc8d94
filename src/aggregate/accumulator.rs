//! Per-request accumulation of a generation stream.

use crate::aggregate::chunk::{AggregateResult, StreamedChunk};
use crate::observability::logging::payload_preview;

/// What happened to one stream record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Applied,
    Blank,
    Malformed,
}

/// Running state for one generation call.
///
/// `model` and `created_at` latch on their first non-empty value; `response`
/// fragments are appended in arrival order. A `done: true` record is only
/// noted: accumulation continues until the caller runs out of records.
#[derive(Debug, Default)]
pub struct GenerateAccumulator {
    model: String,
    created_at: String,
    response: String,
    records: usize,
    malformed: usize,
    done_seen: bool,
}

impl GenerateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and apply one raw record. Blank and malformed records are skipped.
    pub fn ingest(&mut self, record: &[u8]) -> RecordOutcome {
        if record.iter().all(u8::is_ascii_whitespace) {
            return RecordOutcome::Blank;
        }

        match serde_json::from_slice::<StreamedChunk>(record) {
            Ok(chunk) => {
                self.apply(chunk);
                RecordOutcome::Applied
            }
            Err(e) => {
                self.malformed += 1;
                tracing::warn!(
                    error = %e,
                    record = %payload_preview(record),
                    "Skipping malformed stream record"
                );
                RecordOutcome::Malformed
            }
        }
    }

    /// Apply an already parsed record.
    pub fn apply(&mut self, chunk: StreamedChunk) {
        self.records += 1;

        if self.model.is_empty() {
            if let Some(model) = chunk.model.filter(|m| !m.is_empty()) {
                tracing::debug!(model = %model, "Generation model");
                self.model = model;
            }
        }

        if self.created_at.is_empty() {
            if let Some(created_at) = chunk.created_at.filter(|c| !c.is_empty()) {
                tracing::debug!(created_at = %created_at, "Generation created_at");
                self.created_at = created_at;
            }
        }

        if let Some(fragment) = chunk.response {
            tracing::trace!(fragment = %fragment, "Response fragment");
            self.response.push_str(&fragment);
        }

        if chunk.done == Some(true) {
            // Not a stop signal; the stream is read to EOF regardless.
            self.done_seen = true;
            tracing::debug!(records = self.records, "Upstream reported generation done");
        }
    }

    /// Records applied so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Records skipped because they did not parse.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Whether any record carried `done: true`.
    pub fn done_seen(&self) -> bool {
        self.done_seen
    }

    /// Length of the concatenated response so far.
    pub fn response_len(&self) -> usize {
        self.response.len()
    }

    /// Build the aggregate. `done` is always true.
    pub fn finish(self) -> AggregateResult {
        AggregateResult {
            model: self.model,
            created_at: self.created_at,
            response: self.response,
            done: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(records: &[&str]) -> GenerateAccumulator {
        let mut acc = GenerateAccumulator::new();
        for record in records {
            acc.ingest(record.as_bytes());
        }
        acc
    }

    #[test]
    fn concatenates_fragments_in_order() {
        let acc = run(&[
            r#"{"model":"m","created_at":"t1","response":"ab"}"#,
            r#"{"response":"cd","done":false}"#,
            r#"{"response":"ef","done":true}"#,
        ]);
        assert!(acc.done_seen());
        assert_eq!(
            acc.finish(),
            AggregateResult {
                model: "m".into(),
                created_at: "t1".into(),
                response: "abcdef".into(),
                done: true,
            }
        );
    }

    #[test]
    fn malformed_records_are_skipped() {
        let mut acc = GenerateAccumulator::new();
        assert_eq!(acc.ingest(br#"{"model":"m","response":"ab"}"#), RecordOutcome::Applied);
        assert_eq!(acc.ingest(br#"{"response":"c"#), RecordOutcome::Malformed);
        assert_eq!(acc.ingest(b"[1,2,3]"), RecordOutcome::Malformed);
        assert_eq!(acc.ingest(br#"{"response":42}"#), RecordOutcome::Malformed);
        assert_eq!(acc.ingest(&[0xff, 0xfe]), RecordOutcome::Malformed);
        assert_eq!(acc.ingest(br#"{"response":"cd","done":true}"#), RecordOutcome::Applied);

        assert_eq!(acc.records(), 2);
        assert_eq!(acc.malformed(), 4);
        assert_eq!(acc.finish().response, "abcd");
    }

    #[test]
    fn blank_records_are_ignored() {
        let mut acc = GenerateAccumulator::new();
        assert_eq!(acc.ingest(b""), RecordOutcome::Blank);
        assert_eq!(acc.ingest(b"  \t"), RecordOutcome::Blank);
        assert_eq!(acc.records(), 0);
        assert_eq!(acc.malformed(), 0);
    }

    #[test]
    fn model_and_created_at_latch_on_first_value() {
        let result = run(&[
            r#"{"response":"a"}"#,
            r#"{"model":"","created_at":"","response":"b"}"#,
            r#"{"model":"first","response":"c"}"#,
            r#"{"model":"second","created_at":"t1","response":"d"}"#,
            r#"{"created_at":"t2","response":"e"}"#,
        ])
        .finish();
        assert_eq!(result.model, "first");
        assert_eq!(result.created_at, "t1");
        assert_eq!(result.response, "abcde");
    }

    #[test]
    fn records_after_done_still_count() {
        let acc = run(&[
            r#"{"model":"m","response":"hello","done":true}"#,
            r#"{"response":" world"}"#,
        ]);
        assert!(acc.done_seen());
        assert_eq!(acc.finish().response, "hello world");
    }

    #[test]
    fn empty_stream_yields_empty_aggregate() {
        let result = GenerateAccumulator::new().finish();
        assert_eq!(
            result,
            AggregateResult {
                model: String::new(),
                created_at: String::new(),
                response: String::new(),
                done: true,
            }
        );
    }
}
