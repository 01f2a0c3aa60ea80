//! Object store port (driven/secondary port)
//!
//! Interface for the key-addressed content store that mirrored files are
//! written to. The primary implementation targets Azure Blob Storage, but
//! the trait only assumes blob PUT with overwrite semantics plus a parallel
//! JSON PUT for sidecars.

use std::collections::BTreeMap;

use crate::domain::newtypes::BlobKey;

// ============================================================================
// BlobMetadata
// ============================================================================

/// String→string metadata attached to a stored object
///
/// The content store treats metadata keys case-insensitively; keys are
/// lowercased on insertion so retries and overwrites always produce the
/// same stored form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobMetadata(BTreeMap<String, String>);

impl BlobMetadata {
    /// Create an empty metadata map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, lowercasing the key
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(key.as_ref().to_lowercase(), value.into());
    }

    /// Get a value by (case-insensitive) key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no entries are present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for BlobMetadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut metadata = Self::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

// ============================================================================
// IObjectStore trait
// ============================================================================

/// Port trait for key-addressed blob storage
///
/// All writes are overwrite-by-key: repeating a write with identical inputs
/// is safe and leaves exactly one stored object, which is what makes mirror
/// retries idempotent.
#[async_trait::async_trait]
pub trait IObjectStore: Send + Sync {
    /// Upload a blob under `key`, overwriting any existing object
    async fn put_object(
        &self,
        key: &BlobKey,
        data: Vec<u8>,
        metadata: &BlobMetadata,
    ) -> anyhow::Result<()>;

    /// Upload a JSON document under `key` with an `application/json`
    /// content type, overwriting any existing object
    async fn put_json(&self, key: &BlobKey, value: &serde_json::Value) -> anyhow::Result<()>;
}
