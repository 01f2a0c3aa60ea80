//! Microsoft Graph HTTP client
//!
//! Wraps `reqwest::Client` with bearer authentication from an
//! [`IAccessTokenProvider`], transient-failure retries, and the
//! 401 contract: on an unauthorized response the cached token is
//! invalidated and the request is retried exactly once with a fresh token.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use spindex_core::ports::IAccessTokenProvider;
use spindex_core::retry::RetryPolicy;
use tracing::{debug, warn};

use crate::GraphError;

/// Base URL for Microsoft Graph API v1.0
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Authenticated HTTP client for Microsoft Graph calls
///
/// The token provider is shared so the sync engine, CLI, and feed adapter
/// all observe the same cached credential.
pub struct GraphClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn IAccessTokenProvider>,
    retry: RetryPolicy,
}

impl GraphClient {
    /// Creates a client against the production Graph endpoint
    pub fn new(tokens: Arc<dyn IAccessTokenProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: GRAPH_BASE_URL.to_string(),
            tokens,
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a client with a custom base URL (useful for testing)
    pub fn with_base_url(
        tokens: Arc<dyn IAccessTokenProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            tokens,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy for transient failures
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a relative API path and deserialize the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        self.get_json_url(&url).await
    }

    /// GET an absolute URL and deserialize the JSON body
    ///
    /// Used for pagination and cursor URLs, which arrive as full URLs
    /// from the server.
    pub async fn get_json_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .retry
            .run("graph GET", || self.send_authorized(url))
            .await?;

        response
            .json()
            .await
            .context("Failed to parse Graph response body")
    }

    /// GET an absolute URL and return the raw body bytes
    pub async fn get_bytes_url(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .retry
            .run("graph download", || self.send_authorized(url))
            .await?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read download body")?;

        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Sends an authenticated GET, retrying once on 401 with a fresh token
    async fn send_authorized(&self, url: &str) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(GraphError::NetworkError)
            .context("Failed to send Graph request")?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Graph returned 401, refreshing token and retrying once");
            self.tokens.invalidate().await;
            let token = self.tokens.access_token().await?;
            let retried = self
                .client
                .get(url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(GraphError::NetworkError)
                .context("Failed to send Graph request after token refresh")?;
            return check_status(retried).await;
        }

        check_status(response).await
    }
}

/// Converts error status codes into [`GraphError`] values
///
/// The error display carries the status code, which the retry policy's
/// transient classification keys off (429 and 5xx retry, 4xx do not).
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };

    let err = match status {
        StatusCode::UNAUTHORIZED => GraphError::Unauthorized(detail),
        StatusCode::FORBIDDEN => GraphError::Forbidden(detail),
        StatusCode::NOT_FOUND => GraphError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => GraphError::TooManyRequests {
            retry_after: Duration::from_secs(30),
        },
        s if s.is_server_error() => GraphError::ServerError(detail),
        _ => GraphError::InvalidResponse(detail),
    };

    Err(err.into())
}
