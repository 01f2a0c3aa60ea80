//! Spindex Blob - Azure Blob Storage adapter
//!
//! Implements the object-store port against the Azure Blob Storage REST API.
//! Uploads are plain block-blob PUTs with overwrite semantics, which keeps
//! mirror retries idempotent.

pub mod store;

use thiserror::Error;

pub use store::{AzureBlobStore, BlobCredential};

/// Errors that can occur when talking to Azure Blob Storage
#[derive(Debug, Error)]
pub enum BlobError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The container does not exist
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The service rejected the request for another reason
    #[error("Upload rejected: {0}")]
    Rejected(String),
}
