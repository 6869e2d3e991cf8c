//! Query results and execution metadata.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured rows returned by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Execution metadata attached to every result by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultMeta {
    /// Number of rows in the result set.
    pub row_count: usize,
    /// Wall-clock time of the adapter execution that produced this result,
    /// including retries. Unchanged when served from cache.
    pub duration: Duration,
    /// Whether this copy was served from the result cache.
    pub from_cache: bool,
}

/// An adapter response enriched with execution metadata.
///
/// The cached copy is immutable; every cache read returns a fresh clone
/// with `meta.from_cache` set, so callers can never corrupt cache state by
/// mutating what they were handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub data: ResultSet,
    pub meta: ResultMeta,
}

impl QueryResult {
    /// Wrap a fresh adapter response.
    pub(crate) fn fresh(data: ResultSet, duration: Duration) -> Self {
        let row_count = data.rows.len();
        Self {
            data,
            meta: ResultMeta {
                row_count,
                duration,
                from_cache: false,
            },
        }
    }
}
