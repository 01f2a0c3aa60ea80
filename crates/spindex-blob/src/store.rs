//! Block-blob upload store
//!
//! Talks to the Azure Blob Storage REST API directly: a `PUT` with
//! `x-ms-blob-type: BlockBlob` creates or overwrites the blob in one call.
//! Metadata travels as `x-ms-meta-*` headers; keys are already lowercased by
//! [`BlobMetadata`].

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use spindex_core::domain::newtypes::BlobKey;
use spindex_core::ports::{BlobMetadata, IAccessTokenProvider, IObjectStore};
use spindex_core::retry::RetryPolicy;
use tracing::{debug, warn};

use crate::BlobError;

/// Storage service REST API version sent with every request
const STORAGE_API_VERSION: &str = "2023-11-03";

/// Credential used to authorize storage requests
pub enum BlobCredential {
    /// Shared access signature query string (without leading `?`)
    Sas(String),
    /// Bearer token from an Entra ID token provider
    Bearer(Arc<dyn IAccessTokenProvider>),
}

/// Azure Blob Storage implementation of [`IObjectStore`]
///
/// All writes are idempotent overwrites; there is no read path because the
/// mirror only ever pushes content forward.
pub struct AzureBlobStore {
    client: Client,
    account_url: String,
    container: String,
    credential: BlobCredential,
    retry: RetryPolicy,
}

impl AzureBlobStore {
    /// Creates a store for one container of a storage account
    ///
    /// # Arguments
    /// * `account_url` - e.g. `https://myaccount.blob.core.windows.net`
    /// * `container` - target container name
    /// * `credential` - SAS token or bearer token provider
    pub fn new(
        account_url: impl Into<String>,
        container: impl Into<String>,
        credential: BlobCredential,
    ) -> Self {
        Self {
            client: Client::new(),
            account_url: account_url.into().trim_end_matches('/').to_string(),
            container: container.into(),
            credential,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy for transient failures
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn blob_url(&self, key: &BlobKey) -> String {
        let mut url = format!("{}/{}/{}", self.account_url, self.container, key.as_str());
        if let BlobCredential::Sas(sas) = &self.credential {
            url.push('?');
            url.push_str(sas);
        }
        url
    }

    async fn put(
        &self,
        key: &BlobKey,
        data: &[u8],
        content_type: &str,
        metadata: &BlobMetadata,
    ) -> Result<Response> {
        let url = self.blob_url(key);

        let mut request = self
            .client
            .put(&url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("Content-Type", content_type)
            .body(data.to_vec());

        for (meta_key, value) in metadata.iter() {
            request = request.header(format!("x-ms-meta-{meta_key}"), value);
        }

        if let BlobCredential::Bearer(tokens) = &self.credential {
            let token = tokens.access_token().await?;
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(BlobError::NetworkError)
            .context("Failed to send blob upload")?;

        // Bearer tokens can go stale mid-run; refresh and retry once.
        if response.status() == StatusCode::UNAUTHORIZED {
            if let BlobCredential::Bearer(tokens) = &self.credential {
                warn!("Storage returned 401, refreshing token and retrying once");
                tokens.invalidate().await;
                let token = tokens.access_token().await?;

                let mut retried = self
                    .client
                    .put(&url)
                    .header("x-ms-blob-type", "BlockBlob")
                    .header("x-ms-version", STORAGE_API_VERSION)
                    .header("Content-Type", content_type)
                    .bearer_auth(token)
                    .body(data.to_vec());
                for (meta_key, value) in metadata.iter() {
                    retried = retried.header(format!("x-ms-meta-{meta_key}"), value);
                }

                let response = retried
                    .send()
                    .await
                    .map_err(BlobError::NetworkError)
                    .context("Failed to send blob upload after token refresh")?;
                return check_status(response, &self.container).await;
            }
        }

        check_status(response, &self.container).await
    }
}

/// Converts error status codes into [`BlobError`] values
async fn check_status(response: Response, container: &str) -> Result<Response> {
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
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BlobError::Unauthorized(detail),
        StatusCode::NOT_FOUND => BlobError::ContainerNotFound(container.to_string()),
        s if s.is_server_error() => BlobError::ServerError(detail),
        _ => BlobError::Rejected(detail),
    };

    Err(err.into())
}

#[async_trait::async_trait]
impl IObjectStore for AzureBlobStore {
    async fn put_object(
        &self,
        key: &BlobKey,
        data: Vec<u8>,
        metadata: &BlobMetadata,
    ) -> Result<()> {
        debug!(key = key.as_str(), bytes = data.len(), "Uploading blob");

        self.retry
            .run("blob upload", || {
                self.put(key, &data, "application/octet-stream", metadata)
            })
            .await
            .with_context(|| format!("Failed to upload blob '{}'", key.as_str()))?;

        Ok(())
    }

    async fn put_json(&self, key: &BlobKey, value: &serde_json::Value) -> Result<()> {
        let body = serde_json::to_vec_pretty(value).context("Failed to serialize JSON blob")?;
        debug!(key = key.as_str(), "Uploading JSON blob");

        let empty = BlobMetadata::new();
        self.retry
            .run("json blob upload", || {
                self.put(key, &body, "application/json", &empty)
            })
            .await
            .with_context(|| format!("Failed to upload JSON blob '{}'", key.as_str()))?;

        Ok(())
    }
}
