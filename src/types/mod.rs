//! Public types for the Munin API.

mod options;
mod query;
mod result;
mod stats;

pub use options::{Priority, QueryOptions};
pub use query::{Query, QuerySpec};
pub use result::{QueryResult, ResultMeta, ResultSet};
pub use stats::OrchestratorStats;
