//! Core QueryAdapter trait

use async_trait::async_trait;

use crate::types::{Query, ResultSet};
use crate::Result;

/// The adapter contract the orchestrator executes queries through.
///
/// An adapter owns the actual network call against the analytics backend
/// and the parsing of its response into a [`ResultSet`]. The orchestrator
/// never inspects a [`Query`] beyond hashing it; the adapter is free to
/// interpret raw MDX and structured specifications however the backend
/// requires.
///
/// Implementations must be cheap to share (`Arc<dyn QueryAdapter>`); one
/// orchestrator instance owns exactly one adapter.
#[async_trait]
pub trait QueryAdapter: Send + Sync {
    /// Adapter name, used as the `adapter` label on metrics and spans.
    fn name(&self) -> &str;

    /// Execute a query against the backend and return structured rows.
    async fn execute(&self, query: &Query) -> Result<ResultSet>;
}
