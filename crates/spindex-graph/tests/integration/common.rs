//! Shared test helpers for Graph change-feed integration tests
//!
//! Provides wiremock-based mock server setup for the delta endpoints and a
//! stub token provider. Each helper mounts the necessary mock endpoints and
//! returns a configured feed pointing at the mock server.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use spindex_core::ports::IAccessTokenProvider;
use spindex_core::retry::RetryPolicy;
use spindex_graph::client::GraphClient;
use spindex_graph::feed::GraphChangeFeed;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token provider that serves a fixed token and counts invalidations.
///
/// After the first invalidation it serves `fresh-token`, which lets tests
/// assert the 401 retry path picked up a new credential.
pub struct CountingTokens {
    pub invalidations: AtomicU32,
}

impl CountingTokens {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            invalidations: AtomicU32::new(0),
        })
    }
}

#[async_trait::async_trait]
impl IAccessTokenProvider for CountingTokens {
    async fn access_token(&self) -> anyhow::Result<String> {
        if self.invalidations.load(Ordering::SeqCst) == 0 {
            Ok("stale-token".to_string())
        } else {
            Ok("fresh-token".to_string())
        }
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Builds a feed for `sites/site-1/drives/drive-1` rooted at `Reports`,
/// pointed at the mock server, with near-zero retry delays.
pub fn feed_for(server: &MockServer, tokens: Arc<dyn IAccessTokenProvider>) -> GraphChangeFeed {
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(2),
    };
    let client = GraphClient::with_base_url(tokens, server.uri()).with_retry_policy(retry);
    GraphChangeFeed::new(client, "site-1", "drive-1", "Reports")
}

/// Path of the initial delta query for the test feed.
pub const DELTA_PATH: &str = "/sites/site-1/drives/drive-1/root:/Reports:/delta";

/// Mounts a delta endpoint that returns a single terminal page.
pub async fn mount_delta_single_page(
    server: &MockServer,
    items: serde_json::Value,
    delta_token: &str,
) {
    Mock::given(method("GET"))
        .and(path(DELTA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": items,
            "@odata.deltaLink": format!(
                "{}{}?token={}",
                server.uri(),
                DELTA_PATH,
                delta_token
            )
        })))
        .mount(server)
        .await;
}

/// A minimal file item in Graph JSON form.
pub fn file_json(id: &str, name: &str, size: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "eTag": format!("\"{{{id}}},1\""),
        "size": size,
        "webUrl": format!("https://contoso.sharepoint.com/{name}"),
        "lastModifiedDateTime": "2026-01-15T10:00:00Z",
        "parentReference": {
            "driveId": "drive-1",
            "path": "/drives/drive-1/root:/Reports"
        },
        "file": { "mimeType": "application/octet-stream" }
    })
}

/// A minimal folder item in Graph JSON form.
pub fn folder_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "parentReference": {
            "driveId": "drive-1",
            "path": "/drives/drive-1/root:"
        },
        "folder": { "childCount": 1 }
    })
}
