//! Azure AI Search management REST client
//!
//! Authenticates with the admin `api-key` header and pins the
//! `api-version` query parameter on every request. Transient failures
//! (429 and 5xx) are retried through the shared retry policy; everything
//! else surfaces as a typed [`SearchError`].

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use spindex_core::retry::RetryPolicy;
use tracing::debug;

use crate::SearchError;

/// Authenticated client for the search service management API
pub struct SearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    retry: RetryPolicy,
}

impl SearchClient {
    /// Creates a client against the given service endpoint
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy for transient failures
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the service endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one management API request and returns the parsed body
    ///
    /// Returns `None` for bodyless success responses (204, or an empty 200).
    /// 404 maps to [`SearchError::NotFound`]; any other error status maps to
    /// [`SearchError::Provisioning`] carrying the service's error message.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!(
            "{}/{}?api-version={}",
            self.endpoint,
            path.trim_start_matches('/'),
            self.api_version
        );

        self.retry
            .run("search API request", || async {
                debug!(%method, %url, "Search API request");
                let mut request = self
                    .client
                    .request(method.clone(), &url)
                    .header("api-key", &self.api_key)
                    .header("Content-Type", "application/json");
                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = request
                    .send()
                    .await
                    .context("Failed to send search API request")?;

                let status = response.status();
                if status.is_success() {
                    if status == StatusCode::NO_CONTENT {
                        return Ok(None);
                    }
                    let text = response
                        .text()
                        .await
                        .context("Failed to read search API response")?;
                    if text.is_empty() {
                        return Ok(None);
                    }
                    let value = serde_json::from_str(&text)
                        .context("Failed to parse search API response")?;
                    return Ok(Some(value));
                }

                let body = response.text().await.unwrap_or_default();
                if status == StatusCode::NOT_FOUND {
                    return Err(SearchError::NotFound(path.to_string()).into());
                }
                Err(SearchError::Provisioning(service_message(status, &body)).into())
            })
            .await
    }
}

/// Extracts the service's error message from a response body
///
/// Management API errors arrive as `{"error": {"message": "..."}}`; the
/// status code is kept in the detail so the retry policy can classify
/// 429/5xx as transient.
fn service_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string());

    if message.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {message}")
    }
}
