//! Retry configuration and the bounded-backoff execution loop.
//!
//! [`RetryConfig`] controls how many times a failed adapter call is
//! re-attempted and how long to wait between attempts. All retrying goes
//! through the single `with_retry()` helper.
//!
//! Retry here is unconditional: any rejected attempt is retried until the
//! budget is exhausted, and the final error is propagated unchanged. The
//! orchestrator does not classify errors; if selective retry is ever
//! wanted, this helper is the seam where an error classifier would be
//! consulted.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::Result;

/// Configuration for retry behaviour.
///
/// Uses exponential backoff: `initial_delay * 2^attempt`, capped at
/// `max_delay`.
///
/// ```rust
/// # use munin::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_retries(4)
///     .initial_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Re-attempts after the initial request. 0 = single attempt. Default: 2.
    pub max_retries: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the number of re-attempts after the initial request.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the backoff delay for a given attempt number (0-indexed):
    /// 500ms, 1s, 2s, ... with the defaults.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// Execute an async operation, retrying any failure up to
/// `config.max_retries` with exponential backoff. The last error is
/// returned unchanged once the budget is exhausted.
pub(crate) async fn with_retry<F, Fut, T>(config: &RetryConfig, adapter_name: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_retries + 1;
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(e);
                }
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "adapter" => adapter_name.to_owned(),
                )
                .increment(1);
                let delay = config.delay_for_attempt(attempt - 1);
                warn!(
                    adapter = adapter_name,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after failed attempt"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
