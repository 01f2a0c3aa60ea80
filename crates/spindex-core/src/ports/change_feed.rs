//! Change feed port (driven/secondary port)
//!
//! Interface for the cursor-based change-feed protocol consumed by the sync
//! engine. The primary implementation targets a SharePoint document library
//! via the Microsoft Graph delta API, but the trait only assumes the generic
//! pattern: paginated pages of changed items plus a resumption cursor.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - `FeedItem` is a port-level DTO read from one feed page and not retained
//!   beyond a single processing pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// FeedItem
// ============================================================================

/// A single entry from a change-feed page
///
/// Either a folder marker (traversed implicitly by the feed, never mirrored)
/// or a leaf file carrying everything the mirror needs: identity, provenance
/// and a content-retrieval handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// Provider-specific item identifier
    pub id: String,
    /// Display name (file or folder name)
    pub name: String,
    /// Web-facing canonical URL of the item
    pub web_url: Option<String>,
    /// Path of the containing folder, in provider form (may carry a
    /// `drive-id:` style prefix that key derivation strips)
    pub parent_path: Option<String>,
    /// Identifier of the drive (document library) the item belongs to
    pub drive_id: Option<String>,
    /// Raw byte length (None for folders)
    pub size: Option<u64>,
    /// Entity tag for change detection
    pub etag: Option<String>,
    /// Last modified timestamp
    pub modified: Option<DateTime<Utc>>,
    /// Whether this entry is a folder marker
    pub is_folder: bool,
    /// Provider-assigned content-retrieval handle (pre-authorized download
    /// URL when the feed supplies one)
    pub download_url: Option<String>,
}

impl FeedItem {
    /// True for leaf files, the only entries that produce mirrored objects
    #[must_use]
    pub fn is_file(&self) -> bool {
        !self.is_folder
    }
}

// ============================================================================
// ChangeFeedPage
// ============================================================================

/// One page of change-feed results
///
/// Exactly one of `next_link` / `delta_link` is expected to be present:
/// `next_link` means more pages follow, `delta_link` is the terminal
/// resume-from-here cursor that ends the run.
#[derive(Debug, Clone)]
pub struct ChangeFeedPage {
    /// Changed items on this page
    pub items: Vec<FeedItem>,
    /// URL of the next page (present when more pages follow)
    pub next_link: Option<String>,
    /// Terminal cursor URL (present only on the last page)
    pub delta_link: Option<String>,
}

// ============================================================================
// IChangeFeed trait
// ============================================================================

/// Port trait for the paginated change feed
///
/// Implementations own authentication, retry of transient failures and the
/// 401 refresh-and-retry-once contract; the sync engine sees only pages.
#[async_trait::async_trait]
pub trait IChangeFeed: Send + Sync {
    /// URL that starts a full traversal from the configured tree root
    ///
    /// Used when no cursor is persisted (FRESH state).
    fn initial_url(&self) -> String;

    /// Fetch a single page of change entries from the given feed URL
    ///
    /// The URL is either [`initial_url`](Self::initial_url), a persisted
    /// cursor, or the `next_link` of a previous page.
    async fn fetch_page(&self, url: &str) -> anyhow::Result<ChangeFeedPage>;

    /// Download the raw bytes of a file item
    async fn download(&self, item: &FeedItem) -> anyhow::Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_item_file_detection() {
        let file = FeedItem {
            id: "1".to_string(),
            name: "a.txt".to_string(),
            web_url: None,
            parent_path: None,
            drive_id: None,
            size: Some(10),
            etag: None,
            modified: None,
            is_folder: false,
            download_url: None,
        };
        assert!(file.is_file());

        let folder = FeedItem {
            is_folder: true,
            ..file.clone()
        };
        assert!(!folder.is_file());
    }
}
