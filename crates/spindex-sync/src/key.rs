//! Blob key derivation
//!
//! Feed items arrive with provider-form parent paths such as
//! `/drives/b!abc/root:/A/B`. The mirror stores content under clean
//! slash-separated keys that preserve the folder hierarchy: the drive
//! prefix (everything up to and including the last `:`) is stripped and
//! empty path segments are collapsed.

use spindex_core::domain::newtypes::BlobKey;
use spindex_core::domain::DomainError;

/// Derives the blob key for a file from its parent path and name
///
/// The parent path may carry a `...root:` style drive prefix; only the
/// portion after the last `:` contributes to the key. A file directly at
/// the tree root keys to just its name.
pub fn derive_blob_key(parent_path: &str, name: &str) -> Result<BlobKey, DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidBlobKey(
            "file name must not be empty".to_string(),
        ));
    }

    let relative = match parent_path.rfind(':') {
        Some(idx) => &parent_path[idx + 1..],
        None => parent_path,
    };

    let mut segments: Vec<&str> = relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    segments.push(name);

    BlobKey::new(segments.join("/"))
}
