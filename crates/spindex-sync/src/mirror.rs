//! Per-item content mirroring
//!
//! Downloads one file from the change feed and writes it into the object
//! store under its derived key, attaching provenance metadata and a JSON
//! sidecar. The sidecar write is best-effort: a failure is logged but does
//! not fail the item, since the blob itself carries the same metadata.

use std::sync::Arc;

use spindex_core::domain::newtypes::BlobKey;
use spindex_core::domain::DomainError;
use spindex_core::ports::{BlobMetadata, FeedItem, IChangeFeed, IObjectStore};
use thiserror::Error;
use tracing::{debug, warn};

use crate::key::derive_blob_key;

/// Failure while mirroring a single feed item
///
/// Carries the item identity so the run summary can report which file
/// failed without the engine re-attaching it.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The item's path could not be turned into a valid blob key
    #[error("Cannot derive key for '{name}': {cause}")]
    Key {
        /// File name of the offending item
        name: String,
        #[source]
        cause: DomainError,
    },

    /// Fetching the file content from the feed failed
    #[error("Download failed for '{name}': {cause:#}")]
    Download {
        /// File name of the offending item
        name: String,
        cause: anyhow::Error,
    },

    /// Writing the content to the object store failed
    #[error("Upload failed for '{key}': {cause:#}")]
    Upload {
        /// Blob key the upload was addressed to
        key: String,
        cause: anyhow::Error,
    },
}

/// Mirrors individual feed items into the object store
pub struct ContentMirror {
    feed: Arc<dyn IChangeFeed>,
    store: Arc<dyn IObjectStore>,
}

impl ContentMirror {
    /// Creates a mirror reading from `feed` and writing to `store`
    pub fn new(feed: Arc<dyn IChangeFeed>, store: Arc<dyn IObjectStore>) -> Self {
        Self { feed, store }
    }

    /// Mirrors one file item: download, upload, sidecar
    ///
    /// Returns the key the content was stored under.
    pub async fn mirror_item(&self, item: &FeedItem) -> Result<BlobKey, MirrorError> {
        let parent = item.parent_path.as_deref().unwrap_or("");
        let key = derive_blob_key(parent, &item.name).map_err(|cause| MirrorError::Key {
            name: item.name.clone(),
            cause,
        })?;

        debug!(key = key.as_str(), "Mirroring file");

        let data = self
            .feed
            .download(item)
            .await
            .map_err(|cause| MirrorError::Download {
                name: item.name.clone(),
                cause,
            })?;

        let metadata = item_metadata(item);
        self.store
            .put_object(&key, data, &metadata)
            .await
            .map_err(|cause| MirrorError::Upload {
                key: key.as_str().to_string(),
                cause,
            })?;

        let sidecar = sidecar_document(item, &key);
        if let Err(e) = self.store.put_json(&key.sidecar(), &sidecar).await {
            warn!(
                key = key.as_str(),
                "Sidecar upload failed (continuing): {e:#}"
            );
        }

        Ok(key)
    }
}

/// Provenance metadata attached to the mirrored blob
///
/// Always emits all six keys; absent source values become empty strings so
/// downstream consumers can rely on the key set.
fn item_metadata(item: &FeedItem) -> BlobMetadata {
    let mut metadata = BlobMetadata::new();
    metadata.insert("source_url", item.web_url.clone().unwrap_or_default());
    metadata.insert("sp_item_id", item.id.clone());
    metadata.insert("sp_drive_id", item.drive_id.clone().unwrap_or_default());
    metadata.insert("sp_etag", item.etag.clone().unwrap_or_default());
    metadata.insert(
        "sp_mtime",
        item.modified.map(|m| m.to_rfc3339()).unwrap_or_default(),
    );
    metadata.insert("sp_file_name", item.name.clone());
    metadata
}

/// JSON sidecar describing the mirrored file
fn sidecar_document(item: &FeedItem, key: &BlobKey) -> serde_json::Value {
    serde_json::json!({
        "itemId": item.id,
        "name": item.name,
        "blobKey": key.as_str(),
        "originalUrl": item.web_url,
        "driveId": item.drive_id,
        "size": item.size,
        "lastModified": item.modified.map(|m| m.to_rfc3339()),
    })
}
