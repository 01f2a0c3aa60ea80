//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for domain identifiers and values. Each newtype
//! ensures data validity at construction time so the rest of the system can
//! rely on well-formed values.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// DeltaCursor
// ============================================================================

/// Opaque, server-issued resumption token for the change feed
///
/// The cursor is the only durable state between sync runs. It is stored as
/// the full delta URL returned by the feed on its terminal page, and replayed
/// verbatim on the next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeltaCursor(String);

impl DeltaCursor {
    /// Create a new DeltaCursor, rejecting empty values
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidCursor(
                "cursor must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Get the cursor value as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeltaCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeltaCursor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl From<DeltaCursor> for String {
    fn from(cursor: DeltaCursor) -> Self {
        cursor.0
    }
}

// ============================================================================
// BlobKey
// ============================================================================

/// Normalized key of a mirrored object in content storage
///
/// Keys are relative paths: no leading slash, no doubled separators, no
/// drive-prefix residue. [`BlobKey::new`] enforces these invariants; key
/// derivation from remote paths lives in the sync crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobKey(String);

impl BlobKey {
    /// Create a new BlobKey, enforcing key shape invariants
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::InvalidBlobKey(
                "blob key must not be empty".to_string(),
            ));
        }
        if value.starts_with('/') {
            return Err(DomainError::InvalidBlobKey(format!(
                "blob key must be relative: {value}"
            )));
        }
        if value.contains("//") {
            return Err(DomainError::InvalidBlobKey(format!(
                "blob key must not contain doubled separators: {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Get the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the JSON sidecar stored alongside this blob
    #[must_use]
    pub fn sidecar(&self) -> BlobKey {
        BlobKey(format!("{}.json", self.0))
    }
}

impl Display for BlobKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- DeltaCursor --

    #[test]
    fn delta_cursor_accepts_opaque_value() {
        let cursor = DeltaCursor::new("https://feed.example/delta?token=abc".to_string()).unwrap();
        assert_eq!(cursor.as_str(), "https://feed.example/delta?token=abc");
    }

    #[test]
    fn delta_cursor_rejects_empty() {
        assert!(DeltaCursor::new("".to_string()).is_err());
        assert!(DeltaCursor::new("   ".to_string()).is_err());
    }

    #[test]
    fn delta_cursor_round_trips_through_serde() {
        let cursor = DeltaCursor::new("token-123".to_string()).unwrap();
        let json = serde_json::to_string(&cursor).unwrap();
        assert_eq!(json, "\"token-123\"");
        let back: DeltaCursor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cursor);
    }

    // -- BlobKey --

    #[test]
    fn blob_key_accepts_relative_path() {
        let key = BlobKey::new("A/B/f.txt".to_string()).unwrap();
        assert_eq!(key.as_str(), "A/B/f.txt");
    }

    #[test]
    fn blob_key_rejects_leading_slash() {
        assert!(BlobKey::new("/A/f.txt".to_string()).is_err());
    }

    #[test]
    fn blob_key_rejects_doubled_separators() {
        assert!(BlobKey::new("A//f.txt".to_string()).is_err());
    }

    #[test]
    fn blob_key_rejects_empty() {
        assert!(BlobKey::new(String::new()).is_err());
    }

    #[test]
    fn blob_key_sidecar_appends_json_suffix() {
        let key = BlobKey::new("docs/report.pdf".to_string()).unwrap();
        assert_eq!(key.sidecar().as_str(), "docs/report.pdf.json");
    }
}
