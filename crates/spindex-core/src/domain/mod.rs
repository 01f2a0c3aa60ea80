//! Domain entities and business logic
//!
//! This module contains the core domain types for spindex:
//! - Newtypes for type-safe identifiers and validated domain values
//! - Sync run summary aggregation
//! - Search vertical naming and deletion reporting
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod summary;
pub mod vertical;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
pub use summary::SyncSummary;
pub use vertical::{DeletionReport, DeletionStatus, ResourceKind, VerticalHandle, VerticalNames};
