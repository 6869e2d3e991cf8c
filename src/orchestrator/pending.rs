//! In-flight request registry for deduplication.
//!
//! A request that reaches the adapter is represented by a broadcast-capable
//! [`SharedQueryResult`]: a [`Shared`] future over the `oneshot` receiver
//! that the detached execution task settles exactly once. Any number of
//! callers can clone and await it, and all of them observe the same result
//! or the same error. Exactly-once settlement is structural — there is no
//! callback list to keep consistent.

use std::collections::HashMap;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use tokio::sync::oneshot;

use crate::types::QueryResult;
use crate::{MuninError, Result};

/// A cloneable handle on an in-flight (or queued) execution's eventual
/// result.
pub(crate) type SharedQueryResult = Shared<BoxFuture<'static, Result<QueryResult>>>;

/// Build the completion channel for one admitted execution: the sender the
/// execution task settles, and the shared future waiters await.
///
/// If the execution task drops the sender without sending (it should not),
/// waiters observe [`MuninError::Canceled`] rather than hanging.
pub(crate) fn completion_channel() -> (oneshot::Sender<Result<QueryResult>>, SharedQueryResult) {
    let (tx, rx) = oneshot::channel();
    let shared = rx
        .map(|settled| settled.unwrap_or(Err(MuninError::Canceled)))
        .boxed()
        .shared();
    (tx, shared)
}

/// Tracks at most one in-flight execution per query hash.
///
/// Plain map; the orchestrator's state lock provides synchronization.
#[derive(Default)]
pub(crate) struct PendingRegistry {
    inflight: HashMap<String, SharedQueryResult>,
}

impl PendingRegistry {
    /// Handle for an in-flight execution of this hash, if any.
    pub fn get(&self, hash: &str) -> Option<SharedQueryResult> {
        self.inflight.get(hash).cloned()
    }

    /// Register an admitted execution. At most one entry may exist per
    /// hash; the orchestrator checks `get` first under the same lock.
    pub fn register(&mut self, hash: String, shared: SharedQueryResult) {
        debug_assert!(!self.inflight.contains_key(&hash));
        self.inflight.insert(hash, shared);
    }

    /// Remove the entry when its execution settles, success or failure.
    pub fn remove(&mut self, hash: &str) {
        self.inflight.remove(hash);
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }
}
