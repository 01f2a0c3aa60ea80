//! Retry policy for transient network failures
//!
//! An explicit, injectable policy object instead of an implicit wrapper:
//! callers construct a [`RetryPolicy`] once and pass it into the
//! HTTP-calling components, which keeps the backoff schedule testable
//! without sleeping.
//!
//! Default schedule: 3 attempts total, waits of 4s then 8s capped at 10s.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

/// Backoff policy for retrying transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retries)
    pub max_attempts: u32,
    /// Wait before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Upper bound on any single wait
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries, for tests and one-shot probes
    #[must_use]
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based), exponential and capped
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1 << exp);
        delay.min(self.max_delay)
    }

    /// Execute an async operation, retrying transient errors per this policy
    ///
    /// Non-transient errors are returned immediately; transient errors
    /// escalate to fatal once the attempt budget is exhausted.
    pub async fn run<F, Fut, T>(&self, operation: &str, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 1..=self.max_attempts.max(1) {
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if !is_transient_error(&err) {
                        return Err(err);
                    }
                    if attempt < self.max_attempts {
                        let delay = self.delay_for(attempt);
                        warn!(
                            operation,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Transient failure, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("retry budget exhausted for {operation}"))
            .context(format!(
                "{operation} failed after {} attempts",
                self.max_attempts
            )))
    }
}

/// Determines whether an error is transient (retryable)
///
/// Transient errors include network-level failures, rate limiting (429)
/// and server errors (5xx). Authorization failures are not transient:
/// they are handled by the single forced token refresh in the adapters.
pub fn is_transient_error(err: &anyhow::Error) -> bool {
    let err_str = format!("{err:#}").to_lowercase();

    // Network errors
    if err_str.contains("network")
        || err_str.contains("connection")
        || err_str.contains("timeout")
        || err_str.contains("dns")
        || err_str.contains("reset by peer")
        || err_str.contains("broken pipe")
    {
        return true;
    }

    // Rate limiting
    if err_str.contains("429") || err_str.contains("too many requests") {
        return true;
    }

    // Server errors (5xx)
    if err_str.contains("500")
        || err_str.contains("502")
        || err_str.contains("503")
        || err_str.contains("504")
        || err_str.contains("server error")
    {
        return true;
    }

    false
}
