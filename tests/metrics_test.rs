//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter. The async work runs
//! on a current-thread runtime built inside the local recorder scope, so
//! metrics emitted from detached execution tasks land on the same thread
//! the recorder is installed on.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::MetricKind;

use munin::{
    Munin, MuninError, Query, QueryAdapter, QueryOptions, QueryOrchestrator, Result, ResultSet,
    RetryConfig,
};

// ============================================================================
// Mock adapters
// ============================================================================

struct MockAdapter;

#[async_trait]
impl QueryAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, _query: &Query) -> Result<ResultSet> {
        Ok(ResultSet::default())
    }
}

struct FailingAdapter {
    calls: AtomicU32,
}

#[async_trait]
impl QueryAdapter for FailingAdapter {
    fn name(&self) -> &str {
        "failing"
    }

    async fn execute(&self, _query: &Query) -> Result<ResultSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MuninError::Adapter("down".into()))
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

/// Run async orchestrator work on a current-thread runtime inside a local
/// recorder scope, then return the captured snapshot.
fn capture<F, Fut>(f: F) -> SnapshotVec
where
    F: FnOnce(QueryOrchestrator) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    metrics::with_local_recorder(&recorder, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");
        runtime.block_on(async {
            let orch = Munin::builder()
                .adapter(Arc::new(MockAdapter))
                .build()
                .expect("build succeeds");
            f(orch).await;
        });
    });
    snapshotter.snapshot().into_vec()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn executed_request_records_request_metrics() {
    let snapshot = capture(|orch| async move {
        orch.execute(Query::mdx("SELECT"), QueryOptions::default())
            .await
            .expect("query ok");
    });

    assert_eq!(
        counter_total(&snapshot, munin::telemetry::REQUESTS_TOTAL),
        1,
        "expected 1 request counter"
    );
    assert_eq!(
        counter_total(&snapshot, munin::telemetry::CACHE_MISSES_TOTAL),
        1
    );
    assert!(
        has_histogram(&snapshot, munin::telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[test]
fn cache_hit_records_hit_not_request() {
    let snapshot = capture(|orch| async move {
        let query = Query::mdx("SELECT");
        orch.execute(query.clone(), QueryOptions::default())
            .await
            .expect("query ok");
        orch.execute(query, QueryOptions::default())
            .await
            .expect("query ok");
    });

    assert_eq!(counter_total(&snapshot, munin::telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(
        counter_total(&snapshot, munin::telemetry::REQUESTS_TOTAL),
        1,
        "cache hit must not reach the adapter"
    );
}

#[test]
fn deduped_request_records_dedup_hit() {
    let snapshot = capture(|orch| async move {
        let query = Query::mdx("SELECT");
        let (a, b) = tokio::join!(
            orch.execute(query.clone(), QueryOptions::default()),
            orch.execute(query, QueryOptions::default()),
        );
        a.expect("a ok");
        b.expect("b ok");
    });

    assert_eq!(counter_total(&snapshot, munin::telemetry::DEDUP_HITS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, munin::telemetry::REQUESTS_TOTAL), 1);
}

#[test]
fn retries_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    metrics::with_local_recorder(&recorder, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");
        runtime.block_on(async {
            let orch = Munin::builder()
                .adapter(Arc::new(FailingAdapter {
                    calls: AtomicU32::new(0),
                }))
                .retry(
                    RetryConfig::new()
                        .max_retries(2)
                        .initial_delay(Duration::from_millis(1)),
                )
                .build()
                .expect("build succeeds");
            let result = orch
                .execute(Query::mdx("SELECT"), QueryOptions::default())
                .await;
            assert!(result.is_err());
        });
    });
    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, munin::telemetry::RETRIES_TOTAL), 2);
    assert_eq!(
        counter_total(&snapshot, munin::telemetry::REQUESTS_TOTAL),
        1,
        "one request regardless of retries"
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let orch = Munin::builder()
        .adapter(Arc::new(MockAdapter))
        .build()
        .expect("build succeeds");
    orch.execute(Query::mdx("SELECT"), QueryOptions::default())
        .await
        .expect("query ok");
}
