//! OAuth2 device authorization flow for Microsoft Graph
//!
//! Implements the device authorization grant (RFC 8628) for authenticating
//! a headless CLI with the Microsoft identity platform. The user is shown a
//! short code and a verification URL; the flow polls the token endpoint until
//! the user approves or the wait is cancelled.
//!
//! ## Components
//!
//! - [`DeviceCodeFlow`] - device-code challenge, polling and token refresh
//! - [`KeyringTokenStorage`] - secure token storage using the system keyring
//! - [`TokenCache`] - in-process cache implementing `IAccessTokenProvider`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthType, ClientId, DeviceAuthorizationUrl, EndpointNotSet, EndpointSet,
    RefreshToken, Scope, StandardDeviceAuthorizationResponse, TokenResponse, TokenUrl,
};
use spindex_core::ports::{IAccessTokenProvider, Tokens};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::GraphError;

/// Keyring service name for storing tokens
const KEYRING_SERVICE: &str = "spindex";

/// Access tokens within this margin of expiry are refreshed proactively,
/// so a token never goes stale mid-request.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

// ============================================================================
// KeyringTokenStorage
// ============================================================================

/// Stores and retrieves OAuth tokens from the system keyring
///
/// Uses the `keyring` crate to store tokens securely in the OS credential
/// store (e.g., GNOME Keyring, KDE Wallet, macOS Keychain). Tokens are
/// serialized as JSON under the service name "spindex" with the application
/// client ID as the username.
pub struct KeyringTokenStorage;

impl KeyringTokenStorage {
    /// Stores tokens in the system keyring for the given client
    pub fn store(client_id: &str, tokens: &Tokens) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, client_id)
            .context("Failed to create keyring entry")?;

        let json = serde_json::to_string(tokens).context("Failed to serialize tokens")?;

        entry
            .set_password(&json)
            .context("Failed to store tokens in keyring")?;

        debug!("Stored tokens in keyring for client: {}", client_id);
        Ok(())
    }

    /// Loads tokens from the system keyring for the given client
    ///
    /// Returns `Some(Tokens)` if found and valid, `None` if not found.
    pub fn load(client_id: &str) -> Result<Option<Tokens>> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, client_id)
            .context("Failed to create keyring entry")?;

        match entry.get_password() {
            Ok(json) => {
                let tokens: Tokens = serde_json::from_str(&json)
                    .context("Failed to deserialize tokens from keyring")?;
                debug!("Loaded tokens from keyring for client: {}", client_id);
                Ok(Some(tokens))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No tokens found in keyring for client: {}", client_id);
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    /// Removes tokens from the system keyring for the given client
    pub fn clear(client_id: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, client_id)
            .context("Failed to create keyring entry")?;

        match entry.delete_credential() {
            Ok(()) => {
                info!("Cleared tokens from keyring for client: {}", client_id);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No tokens to clear for client: {}", client_id);
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

// ============================================================================
// DeviceCodeFlow
// ============================================================================

/// Instructions shown to the user while the flow waits for approval
#[derive(Debug, Clone)]
pub struct DeviceCodePrompt {
    /// Short code the user types on the verification page
    pub user_code: String,
    /// URL the user opens to approve the sign-in
    pub verification_uri: String,
    /// Seconds until the device code expires
    pub expires_in: u64,
}

/// OAuth2 device authorization flow using the `oauth2` crate
///
/// Handles requesting a device code, polling the token endpoint until the
/// user approves, and refreshing tokens without user interaction.
pub struct DeviceCodeFlow {
    client: BasicClient<EndpointNotSet, EndpointSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    http: reqwest::Client,
    scopes: Vec<String>,
}

impl DeviceCodeFlow {
    /// Creates a flow against the Microsoft identity platform for a tenant
    ///
    /// # Arguments
    /// * `authority` - e.g. `https://login.microsoftonline.com/{tenant}`
    /// * `client_id` - Application (client) ID of the public client
    /// * `scopes` - Delegated scopes to request
    pub fn new(authority: &str, client_id: &str, scopes: Vec<String>) -> Result<Self> {
        let device_url = format!("{authority}/oauth2/v2.0/devicecode");
        let token_url = format!("{authority}/oauth2/v2.0/token");

        // Public clients must send the client ID in the request body,
        // the Microsoft endpoints reject HTTP basic auth without a secret.
        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_device_authorization_url(
                DeviceAuthorizationUrl::new(device_url)
                    .context("Invalid device authorization URL")?,
            )
            .set_token_uri(TokenUrl::new(token_url).context("Invalid token URL")?)
            .set_auth_type(AuthType::RequestBody);

        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            http,
            scopes,
        })
    }

    /// Requests a device code and returns the user-facing prompt
    ///
    /// The returned authorization response must be passed to
    /// [`wait_for_tokens`](Self::wait_for_tokens) to complete the flow.
    pub async fn start(&self) -> Result<(DeviceCodePrompt, StandardDeviceAuthorizationResponse)> {
        info!("Requesting device code");

        let mut request = self.client.exchange_device_code();
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let details: StandardDeviceAuthorizationResponse = request
            .request_async(&self.http)
            .await
            .context("Device code request failed")?;

        let prompt = DeviceCodePrompt {
            user_code: details.user_code().secret().to_string(),
            verification_uri: details.verification_uri().to_string(),
            expires_in: details.expires_in().as_secs(),
        };

        Ok((prompt, details))
    }

    /// Polls the token endpoint until the user approves or `cancel` fires
    pub async fn wait_for_tokens(
        &self,
        details: StandardDeviceAuthorizationResponse,
        cancel: &CancellationToken,
    ) -> Result<Tokens> {
        info!("Waiting for user to approve the device code");

        let poll = self
            .client
            .exchange_device_access_token(&details)
            .request_async(&self.http, tokio::time::sleep, None);

        let token_result = tokio::select! {
            result = poll => result.context("Device code exchange failed")?,
            () = cancel.cancelled() => {
                warn!("Device code wait cancelled");
                return Err(GraphError::Cancelled.into());
            }
        };

        let tokens = into_tokens(&token_result, None);
        info!("Device code flow completed");
        Ok(tokens)
    }

    /// Refreshes an expired access token using a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<Tokens> {
        debug!("Refreshing access token");

        let token = RefreshToken::new(refresh_token.to_string());
        let mut request = self.client.exchange_refresh_token(&token);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let token_result = request
            .request_async(&self.http)
            .await
            .context("Failed to refresh token")?;

        Ok(into_tokens(&token_result, Some(refresh_token)))
    }
}

/// Converts an oauth2 token response into the port-level [`Tokens`]
///
/// Token responses from a refresh may omit the refresh token, in which case
/// the previous one stays valid and is carried forward.
fn into_tokens(
    response: &oauth2::basic::BasicTokenResponse,
    previous_refresh: Option<&str>,
) -> Tokens {
    let expires_at = response
        .expires_in()
        .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
        .unwrap_or_else(|| Utc::now() + Duration::hours(1));

    Tokens {
        access_token: response.access_token().secret().to_string(),
        refresh_token: response
            .refresh_token()
            .map(|t| t.secret().to_string())
            .or_else(|| previous_refresh.map(str::to_string)),
        expires_at,
    }
}

// ============================================================================
// TokenCache
// ============================================================================

/// In-process token cache implementing [`IAccessTokenProvider`]
///
/// Serves cached access tokens while they have more than five minutes of
/// life left, refreshes them from the keyring-persisted refresh token when
/// they don't, and reports [`GraphError::NotLoggedIn`] when no credentials
/// exist at all.
///
/// [`invalidate`](IAccessTokenProvider::invalidate) marks the current
/// credential as rejected: the next
/// [`access_token`](IAccessTokenProvider::access_token) call skips both the
/// in-memory copy and the keyring short-circuit and goes straight through
/// the refresh-token exchange, so a 401 retry never replays the token the
/// server just refused.
pub struct TokenCache {
    flow: DeviceCodeFlow,
    client_id: String,
    cached: tokio::sync::Mutex<Option<Tokens>>,
    rejected: AtomicBool,
}

/// Whether a token on hand may be served as-is or must go through refresh
fn serveable(tokens: &Tokens, rejected: bool, margin: Duration) -> bool {
    !rejected && !tokens.expires_within(margin)
}

impl TokenCache {
    /// Creates a cache backed by the given flow and keyring entry
    pub fn new(flow: DeviceCodeFlow, client_id: impl Into<String>) -> Self {
        Self {
            flow,
            client_id: client_id.into(),
            cached: tokio::sync::Mutex::new(None),
            rejected: AtomicBool::new(false),
        }
    }

    /// Convenience constructor building the flow from config values
    pub fn from_settings(
        authority: &str,
        client_id: &str,
        scopes: Vec<String>,
    ) -> Result<Arc<Self>> {
        let flow = DeviceCodeFlow::new(authority, client_id, scopes)?;
        Ok(Arc::new(Self::new(flow, client_id)))
    }

    /// Stores freshly acquired tokens in both the cache and the keyring
    pub async fn store_login(&self, tokens: Tokens) -> Result<()> {
        KeyringTokenStorage::store(&self.client_id, &tokens)?;
        *self.cached.lock().await = Some(tokens);
        Ok(())
    }

    async fn refresh_and_cache(&self, refresh_token: &str) -> Result<Tokens> {
        let tokens = self.flow.refresh(refresh_token).await?;
        if let Err(e) = KeyringTokenStorage::store(&self.client_id, &tokens) {
            warn!("Failed to persist refreshed tokens: {e:#}");
        }
        Ok(tokens)
    }
}

#[async_trait::async_trait]
impl IAccessTokenProvider for TokenCache {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        let margin = Duration::minutes(EXPIRY_MARGIN_MINUTES);
        let rejected = self.rejected.swap(false, Ordering::SeqCst);

        if let Some(tokens) = cached.as_ref() {
            if serveable(tokens, rejected, margin) {
                return Ok(tokens.access_token.clone());
            }
        }

        // Cache miss, near expiry, or rejected credential: the keyring copy
        // may only be served when it was not the one just refused.
        let stored = KeyringTokenStorage::load(&self.client_id)?;

        let tokens = match stored {
            Some(tokens) if serveable(&tokens, rejected, margin) => tokens,
            Some(tokens) => {
                let refresh_token = tokens
                    .refresh_token
                    .as_deref()
                    .ok_or(GraphError::NotLoggedIn)?;
                self.refresh_and_cache(refresh_token).await?
            }
            None => return Err(GraphError::NotLoggedIn.into()),
        };

        let access_token = tokens.access_token.clone();
        *cached = Some(tokens);
        Ok(access_token)
    }

    async fn invalidate(&self) {
        debug!("Invalidating cached access token");
        *self.cached.lock().await = None;
        self.rejected.store(true, Ordering::SeqCst);
    }
}
