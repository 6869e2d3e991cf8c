//! Tests for in-flight deduplication: identical concurrent requests share
//! one adapter call and one settlement.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use munin::{Munin, MuninError, Query, QueryAdapter, QueryOptions, Result, ResultSet};

/// Adapter that counts calls and yields before answering, so concurrent
/// callers have a window to attach.
struct SlowCountingAdapter {
    calls: AtomicU32,
}

impl SlowCountingAdapter {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryAdapter for SlowCountingAdapter {
    fn name(&self) -> &str {
        "slow-counting"
    }

    async fn execute(&self, _query: &Query) -> Result<ResultSet> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(ResultSet {
            columns: vec!["call".into()],
            rows: vec![vec![json!(call)]],
        })
    }
}

struct AlwaysFailing {
    calls: AtomicU32,
}

#[async_trait]
impl QueryAdapter for AlwaysFailing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn execute(&self, _query: &Query) -> Result<ResultSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err(MuninError::Backend {
            status: 503,
            message: "cube offline".into(),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_identical_requests_share_one_adapter_call() {
    let adapter = Arc::new(SlowCountingAdapter::new());
    let orch = Munin::builder()
        .adapter(adapter.clone())
        .build()
        .expect("build succeeds");
    let query = Query::mdx("SELECT [Measures].[Sales] ON 0 FROM [Cube]");

    let (a, b, c) = tokio::join!(
        orch.execute(query.clone(), QueryOptions::default()),
        orch.execute(query.clone(), QueryOptions::default()),
        orch.execute(query.clone(), QueryOptions::default()),
    );

    let a = a.expect("a ok");
    let b = b.expect("b ok");
    let c = c.expect("c ok");
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(adapter.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn deduped_waiters_all_observe_the_same_error() {
    let adapter = Arc::new(AlwaysFailing {
        calls: AtomicU32::new(0),
    });
    let orch = Munin::builder()
        .adapter(adapter.clone())
        .retry_enabled(false)
        .build()
        .expect("build succeeds");
    let query = Query::mdx("SELECT");

    let (a, b) = tokio::join!(
        orch.execute(query.clone(), QueryOptions::default()),
        orch.execute(query, QueryOptions::default()),
    );

    for outcome in [a, b] {
        match outcome {
            Err(MuninError::Backend { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "cube offline");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn distinct_queries_do_not_dedup() {
    let adapter = Arc::new(SlowCountingAdapter::new());
    let orch = Munin::builder()
        .adapter(adapter.clone())
        .build()
        .expect("build succeeds");

    let (a, b) = tokio::join!(
        orch.execute(Query::mdx("SELECT A"), QueryOptions::default()),
        orch.execute(Query::mdx("SELECT B"), QueryOptions::default()),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(adapter.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn dedup_applies_across_priority_tiers() {
    let adapter = Arc::new(SlowCountingAdapter::new());
    let orch = Munin::builder()
        .adapter(adapter.clone())
        .build()
        .expect("build succeeds");
    let query = Query::mdx("SELECT");

    // Priority only matters for queueing; a pending hash short-circuits
    // regardless.
    let (a, b) = tokio::join!(
        orch.execute(
            query.clone(),
            QueryOptions::default().priority(munin::Priority::Low)
        ),
        orch.execute(
            query,
            QueryOptions::default().priority(munin::Priority::High)
        ),
    );

    assert_eq!(a.expect("a ok"), b.expect("b ok"));
    assert_eq!(adapter.call_count(), 1);
}
