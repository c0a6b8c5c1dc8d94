//! Wire types of the generation stream.

use serde::{Deserialize, Serialize};

/// One record of the upstream's newline-delimited generation stream.
///
/// Every field is optional and unknown fields (`context`, durations, token
/// counts) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamedChunk {
    pub model: Option<String>,
    pub created_at: Option<String>,
    pub response: Option<String>,
    pub done: Option<bool>,
}

/// The single object returned to the client for a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub model: String,
    pub created_at: String,
    pub response: String,
    pub done: bool,
}
