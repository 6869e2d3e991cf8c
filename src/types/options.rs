//! Per-call execution options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Queue priority tier. Lower tiers drain first when a concurrency slot
/// frees up; arrival order is preserved within a tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

/// Options for a single [`execute`](crate::QueryOrchestrator::execute) call.
///
/// ```rust
/// # use munin::{Priority, QueryOptions};
/// # use std::time::Duration;
/// let options = QueryOptions::default()
///     .priority(Priority::High)
///     .cache_ttl(Duration::from_secs(300))
///     .query_id("sales-2024-q1");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Queue priority when the request cannot be admitted immediately.
    #[serde(default)]
    pub priority: Priority,
    /// Per-entry TTL override. Falls back to the orchestrator's
    /// `default_cache_ttl` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<Duration>,
    /// Bypass the cache read for this call. The successful result is still
    /// stored when caching is enabled.
    #[serde(default)]
    pub skip_cache: bool,
    /// Explicit cache key, replacing the hash derived from the query.
    /// Useful for prefix-based invalidation of related queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

impl QueryOptions {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    pub fn query_id(mut self, id: impl Into<String>) -> Self {
        self.query_id = Some(id.into());
        self
    }
}
