//! Munin - Query execution orchestrator for OLAP analytics backends
//!
//! This crate sits between dashboard callers and a pluggable
//! [`QueryAdapter`] that performs the actual network call against an
//! analytics backend. The orchestrator owns the execution policy:
//!
//! - result caching with per-entry TTL and FIFO capacity eviction
//! - deduplication of identical in-flight requests onto one adapter call
//! - a hard concurrency ceiling with a priority-ordered waiting queue
//! - automatic retry with exponential backoff
//! - runtime statistics and `metrics`-facade instrumentation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use munin::{Munin, Priority, Query, QueryAdapter, QueryOptions, Result, ResultSet};
//!
//! struct XmlaAdapter;
//!
//! #[async_trait]
//! impl QueryAdapter for XmlaAdapter {
//!     fn name(&self) -> &str {
//!         "xmla"
//!     }
//!
//!     async fn execute(&self, query: &Query) -> Result<ResultSet> {
//!         // POST to the backend, parse the response...
//!         Ok(ResultSet::default())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> munin::Result<()> {
//!     let orchestrator = Munin::builder()
//!         .adapter(Arc::new(XmlaAdapter))
//!         .max_concurrent(4)
//!         .build()?;
//!
//!     let result = orchestrator
//!         .execute(
//!             Query::mdx("SELECT [Measures].[Sales] ON 0 FROM [Cube]"),
//!             QueryOptions::default().priority(Priority::High),
//!         )
//!         .await?;
//!
//!     println!("{} rows in {:?}", result.meta.row_count, result.meta.duration);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod orchestrator;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use error::{MuninError, Result};
pub use orchestrator::retry::RetryConfig;
pub use orchestrator::{Munin, MuninBuilder, QueryOrchestrator};
pub use traits::QueryAdapter;

// Re-export all types
pub use types::{
    OrchestratorStats, Priority, Query, QueryOptions, QueryResult, QuerySpec, ResultMeta,
    ResultSet,
};
