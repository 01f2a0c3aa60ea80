//! Spindex Graph - Microsoft Graph change-feed adapter
//!
//! Provides the async client for:
//! - OAuth2 authentication (device authorization grant)
//! - SharePoint document library delta queries via Microsoft Graph
//! - File content downloads
//!
//! ## Modules
//!
//! - [`auth`] - Device-code flow, keyring token storage and the token cache
//! - [`client`] - Authenticated Graph HTTP client
//! - [`feed`] - Delta-query change feed implementation

pub mod auth;
pub mod client;
pub mod feed;

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when communicating with the Microsoft Graph API
#[derive(Debug, Error)]
pub enum GraphError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// No stored credentials are available; the user must log in
    #[error("Not logged in, run `spindex auth login` first")]
    NotLoggedIn,

    /// The device-code wait was cancelled before the user approved it
    #[error("Authentication cancelled")]
    Cancelled,

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
