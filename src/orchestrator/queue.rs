//! Priority-ordered waiting list for requests refused immediate admission.
//!
//! Items are kept sorted by ascending priority tier; within a tier arrival
//! order is preserved, because insertion walks to the first item with a
//! strictly greater tier and splices before it. Popping always takes the
//! front.
//!
//! Duplicate blocking: a second request for a hash that is already queued
//! (not yet started) attaches to the existing item's shared future instead
//! of queueing its own. This collapses redundant queued work and is
//! distinct from [`PendingRegistry`](super::pending::PendingRegistry)
//! dedup, which covers already-executing requests.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::oneshot;

use super::pending::SharedQueryResult;
use crate::types::{Priority, Query, QueryResult};
use crate::Result;

/// A queued request waiting for a concurrency slot.
pub(crate) struct QueueItem {
    pub query: Query,
    pub hash: String,
    pub priority: Priority,
    /// TTL to store the eventual result under, resolved at enqueue time.
    pub cache_ttl: Duration,
    /// Settled by the execution task once this item is admitted and run.
    pub tx: oneshot::Sender<Result<QueryResult>>,
    /// Handle every attached waiter awaits.
    pub shared: SharedQueryResult,
}

/// Ordered waiting list. Plain struct; the orchestrator's state lock
/// provides synchronization.
#[derive(Default)]
pub(crate) struct WaitQueue {
    items: VecDeque<QueueItem>,
}

impl WaitQueue {
    /// Insert before the first item with a strictly greater priority tier,
    /// preserving FIFO order within the tier.
    pub fn enqueue(&mut self, item: QueueItem) {
        let position = self
            .items
            .iter()
            .position(|queued| queued.priority > item.priority)
            .unwrap_or(self.items.len());
        self.items.insert(position, item);
    }

    /// Pop the highest-priority (then oldest) item.
    pub fn pop_next(&mut self) -> Option<QueueItem> {
        self.items.pop_front()
    }

    /// Shared future of an already-queued item with this hash, if any.
    pub fn attach(&self, hash: &str) -> Option<SharedQueryResult> {
        self.items
            .iter()
            .find(|item| item.hash == hash)
            .map(|item| item.shared.clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
