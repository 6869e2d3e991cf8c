//! Telemetry metric name constants.
//!
//! Centralised metric names for munin operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `munin_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `adapter` — adapter name (from [`QueryAdapter::name()`](crate::QueryAdapter::name))
//! - `status` — outcome: "ok" or "error"

/// Total queries executed against the adapter.
///
/// Labels: `adapter`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "munin_requests_total";

/// Adapter execution duration in seconds.
///
/// Labels: `adapter`.
pub const REQUEST_DURATION_SECONDS: &str = "munin_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `adapter`.
pub const RETRIES_TOTAL: &str = "munin_retries_total";

/// Total result cache hits.
pub const CACHE_HITS_TOTAL: &str = "munin_cache_hits_total";

/// Total result cache misses.
pub const CACHE_MISSES_TOTAL: &str = "munin_cache_misses_total";

/// Total cache entries evicted at capacity.
pub const CACHE_EVICTIONS_TOTAL: &str = "munin_cache_evictions_total";

/// Requests that attached to an already in-flight or queued execution
/// instead of issuing their own adapter call.
pub const DEDUP_HITS_TOTAL: &str = "munin_dedup_hits_total";

/// Current number of requests waiting for a concurrency slot.
pub const QUEUE_DEPTH: &str = "munin_queue_depth";
