//! Microsoft Graph delta query change feed
//!
//! Implements the [`IChangeFeed`] port against a SharePoint document library.
//! Each page of `GET .../delta` carries changed drive items plus exactly one
//! of `@odata.nextLink` (more pages follow) or `@odata.deltaLink` (terminal
//! resumption cursor).
//!
//! See: <https://learn.microsoft.com/en-us/graph/api/driveitem-delta>

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use spindex_core::ports::{ChangeFeedPage, FeedItem, IChangeFeed};
use tracing::debug;

use crate::client::GraphClient;

// ============================================================================
// Microsoft Graph API response types (JSON deserialization)
// ============================================================================

/// Raw response from the Microsoft Graph delta API
#[derive(Debug, Deserialize)]
struct GraphDeltaResponse {
    /// Array of changed drive items
    #[serde(default)]
    value: Vec<GraphDriveItem>,

    /// URL for the next page of results (present when more pages exist)
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,

    /// URL containing the delta cursor for the next sync cycle
    /// (present only on the last page of results)
    #[serde(rename = "@odata.deltaLink")]
    delta_link: Option<String>,
}

/// A drive item from the Microsoft Graph delta response
///
/// Maps to the DriveItem resource type in the Graph API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphDriveItem {
    /// Unique identifier of the item within the drive
    id: String,

    /// Name of the item (filename or folder name)
    #[serde(default)]
    name: String,

    /// Entity tag for change detection
    e_tag: Option<String>,

    /// Size of the item in bytes (only for files)
    size: Option<u64>,

    /// Web-facing URL of the item
    web_url: Option<String>,

    /// Last modified date and time in ISO 8601 format
    last_modified_date_time: Option<DateTime<Utc>>,

    /// Reference to the parent item
    parent_reference: Option<GraphParentReference>,

    /// File facet (present if the item is a file)
    file: Option<GraphFileFacet>,

    /// Folder facet (present if the item is a folder)
    folder: Option<GraphFolderFacet>,

    /// Pre-authorized short-lived download URL supplied by the feed
    #[serde(rename = "@microsoft.graph.downloadUrl")]
    download_url: Option<String>,
}

/// Parent reference information for a drive item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphParentReference {
    /// Identifier of the drive the item lives in
    drive_id: Option<String>,

    /// Provider-form path of the parent,
    /// e.g. `/drives/b!abc/root:/Reports/2024`
    path: Option<String>,
}

/// File facet indicating the item is a file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphFileFacet {
    /// MIME type reported by the service
    #[allow(dead_code)]
    mime_type: Option<String>,
}

/// Folder facet indicating the item is a folder
///
/// The mere presence of this facet marks the item as a folder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphFolderFacet {
    /// Number of immediate children in the folder
    #[allow(dead_code)]
    child_count: Option<u64>,
}

fn parse_item(item: GraphDriveItem) -> FeedItem {
    let is_folder = item.folder.is_some();
    let parent = item.parent_reference.as_ref();

    FeedItem {
        id: item.id,
        name: item.name,
        web_url: item.web_url,
        parent_path: parent.and_then(|p| p.path.clone()),
        drive_id: parent.and_then(|p| p.drive_id.clone()),
        size: item.size,
        etag: item.e_tag,
        modified: item.last_modified_date_time,
        is_folder,
        download_url: item.download_url,
    }
}

fn parse_response(response: GraphDeltaResponse) -> ChangeFeedPage {
    ChangeFeedPage {
        items: response.value.into_iter().map(parse_item).collect(),
        next_link: response.next_link,
        delta_link: response.delta_link,
    }
}

// ============================================================================
// GraphChangeFeed
// ============================================================================

/// Change feed over one SharePoint document library folder
///
/// Addresses the library as `sites/{site}/drives/{drive}` and roots the
/// traversal at `folder_path` within it. An empty folder path means the
/// drive root.
pub struct GraphChangeFeed {
    client: GraphClient,
    site_id: String,
    drive_id: String,
    folder_path: String,
}

impl GraphChangeFeed {
    /// Creates a feed for the given site, drive and folder
    pub fn new(
        client: GraphClient,
        site_id: impl Into<String>,
        drive_id: impl Into<String>,
        folder_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            site_id: site_id.into(),
            drive_id: drive_id.into(),
            folder_path: folder_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl IChangeFeed for GraphChangeFeed {
    fn initial_url(&self) -> String {
        let base = self.client.base_url();
        let folder = self.folder_path.trim_matches('/');
        if folder.is_empty() {
            format!(
                "{base}/sites/{}/drives/{}/root/delta",
                self.site_id, self.drive_id
            )
        } else {
            format!(
                "{base}/sites/{}/drives/{}/root:/{folder}:/delta",
                self.site_id, self.drive_id
            )
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<ChangeFeedPage> {
        debug!("Fetching delta page");
        let response: GraphDeltaResponse = self
            .client
            .get_json_url(url)
            .await
            .context("Delta page request failed")?;

        let page = parse_response(response);
        debug!(
            items = page.items.len(),
            has_next = page.next_link.is_some(),
            has_delta = page.delta_link.is_some(),
            "Parsed delta page"
        );
        Ok(page)
    }

    async fn download(&self, item: &FeedItem) -> Result<Vec<u8>> {
        let url = match &item.download_url {
            Some(url) => url.clone(),
            None => {
                let drive = item.drive_id.as_deref().unwrap_or(&self.drive_id);
                format!(
                    "{}/drives/{drive}/items/{}/content",
                    self.client.base_url(),
                    item.id
                )
            }
        };

        self.client
            .get_bytes_url(&url)
            .await
            .with_context(|| format!("Failed to download '{}'", item.name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use spindex_core::ports::IAccessTokenProvider;

    use super::*;

    struct StaticTokens;

    #[async_trait::async_trait]
    impl IAccessTokenProvider for StaticTokens {
        async fn access_token(&self) -> Result<String> {
            Ok("token".to_string())
        }

        async fn invalidate(&self) {}
    }

    fn feed(folder: &str) -> GraphChangeFeed {
        let client = GraphClient::with_base_url(Arc::new(StaticTokens), "http://localhost:9");
        GraphChangeFeed::new(client, "site-1", "drive-1", folder)
    }

    #[test]
    fn initial_url_addresses_folder_within_drive() {
        assert_eq!(
            feed("Shared Documents").initial_url(),
            "http://localhost:9/sites/site-1/drives/drive-1/root:/Shared Documents:/delta"
        );
    }

    #[test]
    fn initial_url_for_empty_folder_targets_drive_root() {
        assert_eq!(
            feed("").initial_url(),
            "http://localhost:9/sites/site-1/drives/drive-1/root/delta"
        );
    }

    #[test]
    fn initial_url_strips_surrounding_slashes() {
        assert_eq!(
            feed("/Reports/2024/").initial_url(),
            "http://localhost:9/sites/site-1/drives/drive-1/root:/Reports/2024:/delta"
        );
    }

    #[test]
    fn delta_response_deserializes_with_next_link() {
        let json = r#"{
            "value": [
                {
                    "id": "item-1",
                    "name": "report.docx",
                    "eTag": "\"{AAA},1\"",
                    "size": 2048,
                    "webUrl": "https://contoso.sharepoint.com/r.docx",
                    "lastModifiedDateTime": "2024-05-01T12:00:00Z",
                    "parentReference": {
                        "driveId": "b!abc",
                        "path": "/drives/b!abc/root:/Reports"
                    },
                    "file": { "mimeType": "application/vnd.openxmlformats" },
                    "@microsoft.graph.downloadUrl": "https://download.example/x"
                }
            ],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/next-page"
        }"#;

        let response: GraphDeltaResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.value.len(), 1);
        assert!(response.next_link.is_some());
        assert!(response.delta_link.is_none());

        let page = parse_response(response);
        let item = &page.items[0];
        assert_eq!(item.id, "item-1");
        assert_eq!(item.name, "report.docx");
        assert_eq!(item.etag.as_deref(), Some("\"{AAA},1\""));
        assert_eq!(item.size, Some(2048));
        assert_eq!(item.drive_id.as_deref(), Some("b!abc"));
        assert_eq!(item.parent_path.as_deref(), Some("/drives/b!abc/root:/Reports"));
        assert!(item.is_file());
        assert_eq!(item.download_url.as_deref(), Some("https://download.example/x"));
    }

    #[test]
    fn delta_response_deserializes_folder_and_delta_link() {
        let json = r#"{
            "value": [
                {
                    "id": "folder-1",
                    "name": "Reports",
                    "folder": { "childCount": 3 }
                }
            ],
            "@odata.deltaLink": "https://graph.microsoft.com/v1.0/delta?token=abc"
        }"#;

        let response: GraphDeltaResponse = serde_json::from_str(json).unwrap();
        let page = parse_response(response);
        assert!(page.items[0].is_folder);
        assert!(!page.items[0].is_file());
        assert_eq!(
            page.delta_link.as_deref(),
            Some("https://graph.microsoft.com/v1.0/delta?token=abc")
        );
        assert!(page.next_link.is_none());
    }

    #[test]
    fn delta_response_tolerates_empty_value() {
        let json = r#"{"@odata.deltaLink": "https://g/delta?token=x"}"#;
        let response: GraphDeltaResponse = serde_json::from_str(json).unwrap();
        assert!(response.value.is_empty());
    }
}
