//! Query execution orchestration.
//!
//! [`QueryOrchestrator`] is the façade between dashboard callers and the
//! [`QueryAdapter`]: it owns result caching, in-flight deduplication, the
//! concurrency gate with its priority queue, retry, and runtime counters.
//!
//! # Admission pipeline
//!
//! ```text
//! execute(query, options)
//!        │
//!        ▼
//!  ┌─────────────────────────────┐
//!  │ single critical section     │  cache hit ──► return copy, flagged
//!  │ (cache / pending / queue)   │  in flight ──► await shared future
//!  └─────────────┬───────────────┘  saturated ──► enqueue by priority
//!                │ slot available
//!                ▼
//!  detached execution task ──► retry executor ──► adapter
//!                │ settle (ok or err)
//!                ▼
//!  release slot, store result, drain queue into freed slots
//! ```
//!
//! All bookkeeping between "check cache", "check pending", and "admit or
//! queue" happens under one mutex, so at-most-one-in-flight-per-hash and
//! queue ordering hold even under preemptive scheduling. The lock is never
//! held across an await; the only suspension points are the adapter call
//! and the retry backoff sleep.
//!
//! Execution runs in a detached task, so a request settles and releases
//! its concurrency slot even if every waiter has dropped.

mod builder;
pub(crate) mod pending;
pub(crate) mod queue;
pub mod retry;

pub use builder::{Munin, MuninBuilder};

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::instrument;

use crate::cache::ResultCache;
use crate::telemetry;
use crate::traits::QueryAdapter;
use crate::types::{OrchestratorStats, Query, QueryOptions, QueryResult, ResultSet};
use crate::{MuninError, Result};

use pending::{completion_channel, PendingRegistry, SharedQueryResult};
use queue::{QueueItem, WaitQueue};
use retry::{with_retry, RetryConfig};

/// Construction-time configuration, assembled by [`MuninBuilder`].
#[derive(Debug, Clone)]
pub(crate) struct OrchestratorConfig {
    pub max_concurrent: usize,
    pub cache_enabled: bool,
    pub default_cache_ttl: Duration,
    pub max_cache_size: usize,
    pub block_duplicates: bool,
    pub request_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 6,
            cache_enabled: true,
            default_cache_ttl: Duration::from_secs(60),
            max_cache_size: 200,
            block_duplicates: true,
            request_timeout: None,
        }
    }
}

#[derive(Default)]
struct Counters {
    total_executed: u64,
    cache_hits: u64,
    total_execution: Duration,
}

/// Shared mutable state: everything the admission critical section touches.
struct State {
    cache: ResultCache,
    pending: PendingRegistry,
    queue: WaitQueue,
    active: usize,
    counters: Counters,
}

/// One admitted execution, handed to a detached task.
struct Job {
    query: Query,
    hash: String,
    cache_ttl: Duration,
    tx: oneshot::Sender<Result<QueryResult>>,
}

enum Admission {
    /// Served from cache; no execution happened.
    Cached(QueryResult),
    /// Attached to an in-flight, queued, or newly admitted execution.
    Wait(SharedQueryResult),
}

/// The query execution orchestrator. Cheap to clone; clones share all
/// state. Requires a tokio runtime.
#[derive(Clone)]
pub struct QueryOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    adapter: Arc<dyn QueryAdapter>,
    config: OrchestratorConfig,
    retry: RetryConfig,
    state: Mutex<State>,
}

impl QueryOrchestrator {
    pub(crate) fn new(
        adapter: Arc<dyn QueryAdapter>,
        config: OrchestratorConfig,
        retry: RetryConfig,
    ) -> Self {
        let state = State {
            cache: ResultCache::new(config.max_cache_size),
            pending: PendingRegistry::default(),
            queue: WaitQueue::default(),
            active: 0,
            counters: Counters::default(),
        };
        Self {
            inner: Arc::new(Inner {
                adapter,
                config,
                retry,
                state: Mutex::new(state),
            }),
        }
    }

    /// Execute a query through the cache, dedup, and concurrency gate.
    ///
    /// Resolution order: cache hit (returns a copy flagged as cached),
    /// in-flight request with the same hash (attaches to it), immediate
    /// admission when a slot is free, otherwise the priority queue.
    /// Identical concurrent requests share one adapter call and one
    /// settlement — the same result, or the same error.
    #[instrument(skip(self, query, options), fields(adapter = self.inner.adapter.name(), priority = ?options.priority))]
    pub async fn execute(&self, query: Query, options: QueryOptions) -> Result<QueryResult> {
        let hash = options
            .query_id
            .clone()
            .unwrap_or_else(|| query.cache_key());
        match self.inner.admit(query, options, hash) {
            Admission::Cached(result) => Ok(result),
            Admission::Wait(shared) => shared.await,
        }
    }

    /// Execute a batch of requests and await them all.
    ///
    /// Plain fan-out: each request funnels through the same shared gate,
    /// so concurrency bounding, dedup, and priority apply per call. Result
    /// order matches request order.
    pub async fn execute_many(
        &self,
        requests: Vec<(Query, QueryOptions)>,
    ) -> Vec<Result<QueryResult>> {
        join_all(
            requests
                .into_iter()
                .map(|(query, options)| self.execute(query, options)),
        )
        .await
    }

    /// Drop a single cached entry. In-flight executions are unaffected and
    /// will repopulate the cache when they settle.
    pub fn invalidate(&self, id: &str) -> bool {
        self.inner.state.lock().cache.invalidate(id)
    }

    /// Drop every cached entry whose key starts with `prefix`. Returns the
    /// number of entries removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.inner.state.lock().cache.invalidate_prefix(prefix)
    }

    /// Drop all cached entries.
    pub fn clear_cache(&self) {
        self.inner.state.lock().cache.clear();
    }

    /// Snapshot the running counters.
    pub fn stats(&self) -> OrchestratorStats {
        let state = self.inner.state.lock();
        let counters = &state.counters;
        let answered = counters.total_executed + counters.cache_hits;
        OrchestratorStats {
            total_executed: counters.total_executed,
            cache_hits: counters.cache_hits,
            hit_rate: if answered == 0 {
                0.0
            } else {
                counters.cache_hits as f64 / answered as f64
            },
            active_requests: state.active,
            queued_requests: state.queue.len(),
            avg_execution_ms: if counters.total_executed == 0 {
                0.0
            } else {
                counters.total_execution.as_secs_f64() * 1000.0
                    / counters.total_executed as f64
            },
            cache_size: state.cache.len(),
        }
    }
}

impl Inner {
    /// The admission critical section: cache, pending, and queue are
    /// consulted under one lock so the decision is atomic.
    fn admit(self: &Arc<Self>, query: Query, options: QueryOptions, hash: String) -> Admission {
        let cache_ttl = options.cache_ttl.unwrap_or(self.config.default_cache_ttl);
        let mut job = None;
        let admission = {
            let mut state = self.state.lock();

            if self.config.cache_enabled && !options.skip_cache {
                if let Some(result) = state.cache.get(&hash) {
                    state.counters.cache_hits += 1;
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                    return Admission::Cached(result);
                }
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
            }

            if let Some(shared) = state.pending.get(&hash) {
                metrics::counter!(telemetry::DEDUP_HITS_TOTAL).increment(1);
                return Admission::Wait(shared);
            }

            if state.active < self.config.max_concurrent {
                let (tx, shared) = completion_channel();
                state.active += 1;
                state.pending.register(hash.clone(), shared.clone());
                job = Some(Job {
                    query,
                    hash,
                    cache_ttl,
                    tx,
                });
                Admission::Wait(shared)
            } else {
                if self.config.block_duplicates
                    && let Some(shared) = state.queue.attach(&hash)
                {
                    metrics::counter!(telemetry::DEDUP_HITS_TOTAL).increment(1);
                    return Admission::Wait(shared);
                }
                let (tx, shared) = completion_channel();
                state.queue.enqueue(QueueItem {
                    query,
                    hash,
                    priority: options.priority,
                    cache_ttl,
                    tx,
                    shared: shared.clone(),
                });
                metrics::gauge!(telemetry::QUEUE_DEPTH).set(state.queue.len() as f64);
                Admission::Wait(shared)
            }
        };
        if let Some(job) = job {
            self.spawn_execution(job);
        }
        admission
    }

    fn spawn_execution(self: &Arc<Self>, job: Job) {
        tokio::spawn(Arc::clone(self).run_job(job));
    }

    /// Run one admitted execution to settlement, then hand freed capacity
    /// to queued waiters. Boxed so the drain can spawn further executions
    /// of the same shape.
    fn run_job(self: Arc<Self>, job: Job) -> BoxFuture<'static, ()> {
        async move {
            let started = Instant::now();
            let outcome = with_retry(&self.retry, self.adapter.name(), || {
                self.attempt(&job.query)
            })
            .await;
            let elapsed = started.elapsed();
            self.record_request(outcome.is_ok(), elapsed);
            let result = outcome.map(|data| QueryResult::fresh(data, elapsed));

            let mut admitted = Vec::new();
            {
                let mut state = self.state.lock();
                state.active -= 1;
                state.pending.remove(&job.hash);
                if let Ok(ref fresh) = result {
                    if self.config.cache_enabled {
                        state.cache.put(job.hash.clone(), fresh.clone(), job.cache_ttl);
                    }
                    state.counters.total_executed += 1;
                    state.counters.total_execution += elapsed;
                }
                // Hand every freed slot to the highest-priority waiter,
                // success or failure alike.
                while state.active < self.config.max_concurrent {
                    let Some(item) = state.queue.pop_next() else {
                        break;
                    };
                    state.active += 1;
                    state.pending.register(item.hash.clone(), item.shared.clone());
                    admitted.push(item);
                }
                metrics::gauge!(telemetry::QUEUE_DEPTH).set(state.queue.len() as f64);
            }
            job.tx.send(result).ok();
            for item in admitted {
                self.spawn_execution(Job {
                    query: item.query,
                    hash: item.hash,
                    cache_ttl: item.cache_ttl,
                    tx: item.tx,
                });
            }
        }
        .boxed()
    }

    /// One adapter attempt, bounded by the optional request timeout.
    async fn attempt(&self, query: &Query) -> Result<ResultSet> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.adapter.execute(query))
                .await
                .map_err(|_| MuninError::Timeout(limit))?,
            None => self.adapter.execute(query).await,
        }
    }

    /// Record request outcome metrics (counter + histogram).
    fn record_request(&self, ok: bool, elapsed: Duration) {
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "adapter" => self.adapter.name().to_owned(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "adapter" => self.adapter.name().to_owned(),
        )
        .record(elapsed.as_secs_f64());
    }
}
