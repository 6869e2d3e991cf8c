//! Builder for configuring orchestrator instances

use std::sync::Arc;
use std::time::Duration;

use super::retry::RetryConfig;
use super::{OrchestratorConfig, QueryOrchestrator};
use crate::traits::QueryAdapter;
use crate::{MuninError, Result};

/// Main entry point for creating orchestrator instances.
pub struct Munin;

impl Munin {
    /// Create a new builder for configuring the orchestrator.
    pub fn builder() -> MuninBuilder {
        MuninBuilder::new()
    }
}

/// Builder for configuring orchestrator instances.
///
/// Every option has a default; only the adapter is required.
pub struct MuninBuilder {
    adapter: Option<Arc<dyn QueryAdapter>>,
    config: OrchestratorConfig,
    retry_enabled: bool,
    retry: RetryConfig,
}

impl MuninBuilder {
    pub fn new() -> Self {
        Self {
            adapter: None,
            config: OrchestratorConfig::default(),
            retry_enabled: true,
            retry: RetryConfig::default(),
        }
    }

    /// Set the adapter all queries execute through. Required.
    pub fn adapter(mut self, adapter: Arc<dyn QueryAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Hard cap on simultaneous in-flight adapter calls. Default: 6.
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.max_concurrent = n;
        self
    }

    /// Master switch for result caching. Default: enabled.
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache_enabled = enabled;
        self
    }

    /// Per-entry lifetime when not overridden per call. Default: 60s.
    pub fn default_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_cache_ttl = ttl;
        self
    }

    /// Entry cap before FIFO eviction, 0 = unbounded. Default: 200.
    pub fn max_cache_size(mut self, n: usize) -> Self {
        self.config.max_cache_size = n;
        self
    }

    /// Master switch for retry. Default: enabled.
    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry_enabled = enabled;
        self
    }

    /// Re-attempts after the initial request. Default: 2.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.retry.max_retries = n;
        self
    }

    /// Full retry configuration (backoff base and cap included).
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Collapse identical queued requests onto one queue item.
    /// Default: enabled.
    pub fn block_duplicates(mut self, enabled: bool) -> Self {
        self.config.block_duplicates = enabled;
        self
    }

    /// Deadline for a single adapter attempt. A timed-out attempt fails
    /// with [`MuninError::Timeout`] and is retried like any other failure.
    /// Default: none.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<QueryOrchestrator> {
        let adapter = self.adapter.ok_or(MuninError::NoAdapter)?;
        if self.config.max_concurrent == 0 {
            return Err(MuninError::Configuration(
                "max_concurrent must be at least 1".into(),
            ));
        }
        let retry = if self.retry_enabled {
            self.retry
        } else {
            RetryConfig {
                max_retries: 0,
                ..self.retry
            }
        };
        Ok(QueryOrchestrator::new(adapter, self.config, retry))
    }
}

impl Default for MuninBuilder {
    fn default() -> Self {
        Self::new()
    }
}
