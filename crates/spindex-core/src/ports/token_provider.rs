//! Access token provider port (driven/secondary port)
//!
//! Interface for obtaining bearer credentials for the change-feed API.
//! The primary implementation is an interactive device-code flow with an
//! in-process cache and keyring-backed refresh tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Tokens
// ============================================================================

/// OAuth tokens received from the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    /// Bearer token for authenticating API requests
    pub access_token: String,
    /// Token for refreshing the access token without user interaction
    /// (requires the `offline_access` scope)
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Returns true if the access token has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns true if the access token will expire within the given duration
    #[must_use]
    pub fn expires_within(&self, duration: Duration) -> bool {
        Utc::now() + duration >= self.expires_at
    }
}

// ============================================================================
// IAccessTokenProvider trait
// ============================================================================

/// Port trait for bearer credential acquisition
///
/// The 401 contract is caller-driven: on an unauthorized response the caller
/// invalidates the cache and retries exactly once with a fresh token. The
/// provider never refreshes in the background.
#[async_trait::async_trait]
pub trait IAccessTokenProvider: Send + Sync {
    /// Return a valid access token, acquiring or refreshing one if needed
    async fn access_token(&self) -> anyhow::Result<String>;

    /// Drop the cached token so the next call re-acquires
    async fn invalidate(&self);
}
