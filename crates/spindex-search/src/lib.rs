//! Spindex Search - Azure AI Search provisioning client
//!
//! Manages the four-resource search pipeline (data source, skillset, index,
//! indexer) over the service's management REST API. All creates are
//! idempotent PUT-by-name upserts, so re-provisioning converges instead of
//! failing on "already exists".
//!
//! ## Modules
//!
//! - [`client`] - authenticated management REST client
//! - [`definitions`] - JSON resource definition builders
//! - [`provisioning`] - pipeline and vertical lifecycle operations

pub mod client;
pub mod definitions;
pub mod provisioning;

use thiserror::Error;

pub use client::SearchClient;
pub use definitions::{ProvisionContext, VerticalOverrides};
pub use provisioning::{ExecutionRecord, IndexerStatus};

/// Errors that can occur when talking to the search management API
#[derive(Debug, Error)]
pub enum SearchError {
    /// The addressed resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The service rejected the request; carries the service error message
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
