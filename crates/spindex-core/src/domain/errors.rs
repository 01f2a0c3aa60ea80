//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and malformed identifiers.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid delta cursor (empty or malformed)
    #[error("Invalid delta cursor: {0}")]
    InvalidCursor(String),

    /// Invalid blob storage key
    #[error("Invalid blob key: {0}")]
    InvalidBlobKey(String),

    /// Invalid vertical prefix (empty or contains characters the search
    /// service rejects in resource names)
    #[error("Invalid vertical prefix: {0}")]
    InvalidPrefix(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
