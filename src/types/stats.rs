//! Runtime statistics snapshot.

use serde::{Deserialize, Serialize};

/// Point-in-time view of orchestrator counters, computed on demand by
/// [`QueryOrchestrator::stats()`](crate::QueryOrchestrator::stats).
///
/// Counters reset only when the orchestrator is recreated. Independent of
/// the `metrics` facade, so callers get numbers without installing a
/// recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStats {
    /// Successfully executed adapter calls.
    pub total_executed: u64,
    /// Requests answered from the result cache.
    pub cache_hits: u64,
    /// `cache_hits / (total_executed + cache_hits)`, 0.0 before any traffic.
    pub hit_rate: f64,
    /// Requests currently in flight to the adapter.
    pub active_requests: usize,
    /// Requests waiting for a concurrency slot.
    pub queued_requests: usize,
    /// Mean adapter execution time over successful requests, in ms.
    pub avg_execution_ms: f64,
    /// Entries currently in the result cache.
    pub cache_size: usize,
}
