//! Page-by-page delta sync loop
//!
//! The engine's only durable state is the cursor: absent means a fresh full
//! traversal, present means incremental resume. Each page is fully applied
//! (every file item mirrored or recorded as failed) before the loop moves
//! on, and the terminal cursor is persisted only once its page has been
//! applied. A crash mid-run therefore re-fetches from the previous cursor
//! instead of losing changes; overwrite-by-key uploads make the replay
//! harmless.

use std::sync::Arc;

use anyhow::{Context, Result};
use spindex_core::domain::newtypes::DeltaCursor;
use spindex_core::domain::SyncSummary;
use spindex_core::ports::{IChangeFeed, ICursorStore, IObjectStore};
use tracing::{debug, info, warn};

use crate::mirror::ContentMirror;

/// Whether a run started from scratch or resumed from a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No cursor persisted; full traversal of the tree
    Fresh,
    /// Resuming from the cursor of a previous completed run
    Incremental,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

/// Cursor-driven sync engine
pub struct SyncEngine {
    feed: Arc<dyn IChangeFeed>,
    cursors: Arc<dyn ICursorStore>,
    mirror: ContentMirror,
}

impl SyncEngine {
    /// Creates an engine over the given feed, cursor store and object store
    pub fn new(
        feed: Arc<dyn IChangeFeed>,
        cursors: Arc<dyn ICursorStore>,
        store: Arc<dyn IObjectStore>,
    ) -> Self {
        let mirror = ContentMirror::new(feed.clone(), store);
        Self {
            feed,
            cursors,
            mirror,
        }
    }

    /// Runs one synchronization pass to completion
    ///
    /// Returns a summary of files seen, mirrored, and failed. Per-item
    /// failures are tolerated and reported; page-level failures abort the
    /// run with the cursor untouched so the next run replays the page.
    pub async fn run(&self) -> Result<SyncSummary> {
        let (mut url, state) = match self.cursors.load().await? {
            Some(cursor) => (cursor.into(), SyncState::Incremental),
            None => (self.feed.initial_url(), SyncState::Fresh),
        };

        info!(%state, "Starting sync run");

        let mut summary = SyncSummary::new();
        let mut page_count = 0u32;

        loop {
            let page = self
                .feed
                .fetch_page(&url)
                .await
                .with_context(|| format!("Failed to fetch feed page {}", page_count + 1))?;
            page_count += 1;

            for item in page.items.iter().filter(|item| item.is_file()) {
                match self.mirror.mirror_item(item).await {
                    Ok(key) => {
                        debug!(key = key.as_str(), "Mirrored");
                        summary.record_success();
                    }
                    Err(e) => {
                        warn!(name = %item.name, "Failed to mirror item: {e}");
                        summary.record_failure(e.to_string());
                    }
                }
            }

            // The page is now fully applied; only then may its cursor land.
            if let Some(next) = page.next_link {
                url = next;
                continue;
            }

            let delta_link = page.delta_link.ok_or_else(|| {
                anyhow::anyhow!("Feed page carried neither a next link nor a delta link")
            })?;
            let cursor = DeltaCursor::new(delta_link).context("Feed returned empty delta link")?;
            self.cursors
                .store(&cursor)
                .await
                .context("Failed to persist cursor")?;
            break;
        }

        info!(
            pages = page_count,
            total = summary.total,
            processed = summary.processed,
            failed = summary.errors.len(),
            "Sync run complete"
        );
        Ok(summary)
    }
}
