//! File-backed cursor store
//!
//! Persists the delta cursor as a small JSON document so a sync run can
//! resume where the previous one finished. Writes go through a temp file
//! and rename, so a crash mid-write leaves the previous cursor intact.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spindex_core::domain::newtypes::DeltaCursor;
use spindex_core::ports::ICursorStore;
use tracing::debug;

/// On-disk shape of the cursor file
#[derive(Debug, Serialize, Deserialize)]
struct CursorFile {
    delta_url: DeltaCursor,
}

/// [`ICursorStore`] backed by a JSON file
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    /// Creates a store persisting to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ICursorStore for FileCursorStore {
    async fn load(&self) -> Result<Option<DeltaCursor>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cursor file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to read cursor file {}", self.path.display())))
            }
        };

        let file: CursorFile =
            serde_json::from_str(&content).context("Cursor file is malformed")?;
        debug!("Loaded cursor from {}", self.path.display());
        Ok(Some(file.delta_url))
    }

    async fn store(&self, cursor: &DeltaCursor) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = CursorFile {
            delta_url: cursor.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize cursor")?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to move cursor into {}", self.path.display()))?;

        debug!("Stored cursor to {}", self.path.display());
        Ok(())
    }
}
