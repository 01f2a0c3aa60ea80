//! Sync run summary
//!
//! Ephemeral report produced once per sync invocation. Per-item mirror
//! failures are recorded here instead of aborting the run; only the final
//! counts and messages surface to the operator.

use serde::Serialize;

/// Summary of a completed (or aborted) synchronization run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    /// Number of file entries seen in the change feed (folders excluded)
    pub total: u32,
    /// Number of files mirrored successfully
    pub processed: u32,
    /// Per-item failure messages, in feed order
    pub errors: Vec<String>,
}

impl SyncSummary {
    /// Create an empty summary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully mirrored file
    pub fn record_success(&mut self) {
        self.total += 1;
        self.processed += 1;
    }

    /// Record a file that failed to mirror
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.total += 1;
        self.errors.push(message.into());
    }

    /// Success rate in percent (0.0 when no files were seen)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.processed) / f64::from(self.total) * 100.0
        }
    }

    /// True when every file seen was mirrored
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
