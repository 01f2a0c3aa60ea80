//! Search vertical naming and lifecycle reporting
//!
//! A "vertical" is a named bundle of four co-addressed search resources
//! (data source, skillset, index, indexer) sharing a derived name prefix.
//! The bundle is created/updated idempotently by name and deleted as a unit,
//! ordered to respect server-side dependency constraints.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::errors::DomainError;

// ============================================================================
// ResourceKind
// ============================================================================

/// The four provisioned resource kinds that make up a vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    DataSource,
    Skillset,
    Index,
    Indexer,
}

impl ResourceKind {
    /// REST collection path for this resource kind
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::DataSource => "datasources",
            ResourceKind::Skillset => "skillsets",
            ResourceKind::Index => "indexes",
            ResourceKind::Indexer => "indexers",
        }
    }

    /// Short name prefix used when deriving resource names
    #[must_use]
    pub fn name_prefix(&self) -> &'static str {
        match self {
            ResourceKind::DataSource => "ds",
            ResourceKind::Skillset => "ss",
            ResourceKind::Index => "idx",
            ResourceKind::Indexer => "ix",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::DataSource => "data source",
            ResourceKind::Skillset => "skillset",
            ResourceKind::Index => "index",
            ResourceKind::Indexer => "indexer",
        };
        write!(f, "{label}")
    }
}

// ============================================================================
// VerticalNames
// ============================================================================

/// Resolved resource names for one vertical prefix
///
/// Names are stable and derived: `ds-{prefix}`, `ss-{prefix}`, `idx-{prefix}`,
/// `ix-{prefix}`. The same prefix always addresses the same four resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerticalNames {
    pub prefix: String,
    pub data_source: String,
    pub skillset: String,
    pub index: String,
    pub indexer: String,
}

impl VerticalNames {
    /// Derive the four resource names from a prefix
    ///
    /// The search service restricts resource names to lowercase letters,
    /// digits and dashes; the prefix is validated against that alphabet.
    pub fn for_prefix(prefix: &str) -> Result<Self, DomainError> {
        if prefix.is_empty() {
            return Err(DomainError::InvalidPrefix(
                "prefix must not be empty".to_string(),
            ));
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DomainError::InvalidPrefix(format!(
                "prefix must be lowercase alphanumeric with dashes: {prefix}"
            )));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            data_source: format!("ds-{prefix}"),
            skillset: format!("ss-{prefix}"),
            index: format!("idx-{prefix}"),
            indexer: format!("ix-{prefix}"),
        })
    }

    /// Resolved name for a resource kind
    #[must_use]
    pub fn name_for(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::DataSource => &self.data_source,
            ResourceKind::Skillset => &self.skillset,
            ResourceKind::Index => &self.index,
            ResourceKind::Indexer => &self.indexer,
        }
    }
}

// ============================================================================
// VerticalHandle
// ============================================================================

/// Handle returned after provisioning a vertical
///
/// Carries the resolved names so callers can poll the indexer or address
/// the index without re-deriving names.
#[derive(Debug, Clone, Serialize)]
pub struct VerticalHandle {
    pub names: VerticalNames,
    /// Whether the indexer run was triggered after provisioning
    pub run_started: bool,
}

// ============================================================================
// Deletion reporting
// ============================================================================

/// Outcome of deleting a single vertical resource
///
/// `NotFound` is a success for deletion purposes: the resource is absent,
/// which is the desired end state. `Failed` carries the actual server
/// response instead of assuming success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DeletionStatus {
    Deleted,
    NotFound,
    Failed(String),
}

impl DeletionStatus {
    /// True unless the server reported a real failure
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, DeletionStatus::Failed(_))
    }
}

impl Display for DeletionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeletionStatus::Deleted => write!(f, "deleted"),
            DeletionStatus::NotFound => write!(f, "skipped (not found)"),
            DeletionStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-resource outcome entry in a [`DeletionReport`]
#[derive(Debug, Clone, Serialize)]
pub struct DeletionEntry {
    pub kind: ResourceKind,
    pub name: String,
    pub outcome: DeletionStatus,
}

/// Report of a vertical deletion, in the order the resources were deleted
#[derive(Debug, Clone, Serialize)]
pub struct DeletionReport {
    pub prefix: String,
    pub entries: Vec<DeletionEntry>,
}

impl DeletionReport {
    /// True when no resource reported a real failure
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_success())
    }
}
