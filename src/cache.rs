//! Result cache with FIFO eviction and lazy TTL expiry.
//!
//! [`ResultCache`] is a bounded key→result map owned by one orchestrator
//! instance. Two properties distinguish it from a general-purpose cache
//! crate and are why it is hand-built on an explicit ordered structure
//! (hash map + insertion-order deque):
//!
//! - Eviction at capacity removes the **oldest-inserted** entry. Access
//!   does not promote an entry; this is strict FIFO, not LRU.
//! - Keys are plain strings, so invalidation can target a single key or
//!   every key under a prefix (callers that set explicit `query_id`s get
//!   group invalidation for free).
//!
//! Expiry is lazy: a read past an entry's TTL evicts it as a side effect.
//! There is no background sweep.
//!
//! Timestamps use `tokio::time::Instant` so tests can drive expiry with
//! the runtime's virtual clock; outside a runtime it falls back to the
//! system monotonic clock.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::QueryResult;

struct CacheEntry {
    result: QueryResult,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// Bounded, TTL-aware result store. Never blocks; all methods are plain
/// map mutation. The owning orchestrator provides synchronization.
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order; front is the eviction candidate. Kept in
    /// exact sync with `entries`.
    order: VecDeque<String>,
    max_size: usize,
}

impl ResultCache {
    /// Create a cache holding at most `max_size` entries. 0 = unbounded.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_size,
        }
    }

    /// Look up a fresh entry, returning a copy flagged as cache-served.
    ///
    /// A stale entry is evicted as a side effect and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<QueryResult> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.expired(now) => {
                let mut result = entry.result.clone();
                result.meta.from_cache = true;
                Some(result)
            }
            Some(_) => {
                debug!(key, "evicting expired cache entry");
                self.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result. At capacity the oldest-inserted entry is evicted
    /// first. Re-putting an existing key re-inserts it at the back of the
    /// eviction order.
    pub fn put(&mut self, key: impl Into<String>, result: QueryResult, ttl: Duration) {
        let key = key.into();
        if self.entries.contains_key(&key) {
            self.remove(&key);
        }
        if self.max_size > 0 {
            while self.entries.len() >= self.max_size {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
                debug!(key = %oldest, "evicted oldest cache entry at capacity");
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                result,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Remove a single entry. Returns whether it existed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.remove(key)
    }

    /// Remove every entry whose key starts with `prefix`. Returns the
    /// number of entries removed.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in &matching {
            self.remove(key);
        }
        if !matching.is_empty() {
            debug!(prefix, count = matching.len(), "invalidated cache entries by prefix");
        }
        matching.len()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }
}
