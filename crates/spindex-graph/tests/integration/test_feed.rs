//! Integration tests for the delta change feed
//!
//! Verifies end-to-end behavior against a wiremock-based Graph mock:
//! - Initial page fetch and item parsing
//! - Pagination via @odata.nextLink
//! - Terminal cursor via @odata.deltaLink
//! - File downloads (pre-authorized URL and content endpoint)
//! - 401 refresh-and-retry-once
//! - Transient 503 retry

use std::sync::atomic::Ordering;

use spindex_core::ports::IChangeFeed;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn initial_page_returns_parsed_items_and_cursor() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens);

    let items = serde_json::json!([
        common::file_json("file-001", "q1.docx", 1024),
        common::folder_json("folder-001", "2024"),
    ]);
    common::mount_delta_single_page(&server, items, "cursor-001").await;

    let page = feed
        .fetch_page(&feed.initial_url())
        .await
        .expect("initial page fetch failed");

    assert_eq!(page.items.len(), 2);
    assert!(page.next_link.is_none());
    let delta = page.delta_link.expect("terminal page must carry deltaLink");
    assert!(delta.contains("token=cursor-001"));

    let file = &page.items[0];
    assert_eq!(file.id, "file-001");
    assert_eq!(file.name, "q1.docx");
    assert_eq!(file.size, Some(1024));
    assert_eq!(file.parent_path.as_deref(), Some("/drives/drive-1/root:/Reports"));
    assert!(file.is_file());

    assert!(page.items[1].is_folder);
}

#[tokio::test]
async fn pagination_follows_next_link_to_terminal_page() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens);

    // Page 1: three files plus a nextLink.
    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                common::file_json("f1", "a.txt", 10),
                common::file_json("f2", "b.txt", 20),
                common::file_json("f3", "c.txt", 30),
            ],
            "@odata.nextLink": format!("{}{}?$skiptoken=page2", server.uri(), common::DELTA_PATH)
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Page 2: two files plus the terminal deltaLink.
    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .and(query_param("$skiptoken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                common::file_json("f4", "d.txt", 40),
                common::file_json("f5", "e.txt", 50),
            ],
            "@odata.deltaLink": format!("{}{}?token=Y", server.uri(), common::DELTA_PATH)
        })))
        .mount(&server)
        .await;

    let page1 = feed.fetch_page(&feed.initial_url()).await.unwrap();
    assert_eq!(page1.items.len(), 3);
    assert!(page1.delta_link.is_none());
    let next = page1.next_link.expect("page 1 must carry nextLink");

    let page2 = feed.fetch_page(&next).await.unwrap();
    assert_eq!(page2.items.len(), 2);
    assert!(page2.next_link.is_none());
    assert!(page2.delta_link.unwrap().ends_with("token=Y"));
}

#[tokio::test]
async fn download_prefers_preauthorized_url() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens);

    Mock::given(method("GET"))
        .and(path("/preauth/file-001"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .mount(&server)
        .await;

    let mut items = serde_json::json!([common::file_json("file-001", "a.txt", 5)]);
    items[0]["@microsoft.graph.downloadUrl"] =
        serde_json::json!(format!("{}/preauth/file-001", server.uri()));
    common::mount_delta_single_page(&server, items, "c").await;

    let page = feed.fetch_page(&feed.initial_url()).await.unwrap();
    let bytes = feed.download(&page.items[0]).await.unwrap();
    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn download_falls_back_to_content_endpoint() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens);

    Mock::given(method("GET"))
        .and(path("/drives/drive-1/items/file-002/content"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"content-bytes".to_vec()))
        .mount(&server)
        .await;

    common::mount_delta_single_page(
        &server,
        serde_json::json!([common::file_json("file-002", "b.txt", 13)]),
        "c",
    )
    .await;

    let page = feed.fetch_page(&feed.initial_url()).await.unwrap();
    assert!(page.items[0].download_url.is_none());
    let bytes = feed.download(&page.items[0]).await.unwrap();
    assert_eq!(bytes, b"content-bytes");
}

#[tokio::test]
async fn unauthorized_response_triggers_single_token_refresh() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens.clone());

    // The stale token is rejected; the refreshed one succeeds.
    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_json("f1", "a.txt", 1)],
            "@odata.deltaLink": format!("{}{}?token=Z", server.uri(), common::DELTA_PATH)
        })))
        .mount(&server)
        .await;

    let page = feed.fetch_page(&feed.initial_url()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(tokens.invalidations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens);

    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [],
            "@odata.deltaLink": format!("{}{}?token=after-retry", server.uri(), common::DELTA_PATH)
        })))
        .mount(&server)
        .await;

    let page = feed.fetch_page(&feed.initial_url()).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.delta_link.unwrap().contains("after-retry"));
}

#[tokio::test]
async fn connection_failure_surfaces_as_network_error() {
    use spindex_graph::GraphError;

    let tokens = common::CountingTokens::new();
    // Nothing listens on port 1, so every attempt is refused.
    let client = spindex_graph::client::GraphClient::with_base_url(tokens, "http://127.0.0.1:1")
        .with_retry_policy(spindex_core::retry::RetryPolicy {
            max_attempts: 2,
            base_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(2),
        });

    let err = client
        .get_json_url::<serde_json::Value>("http://127.0.0.1:1/delta")
        .await
        .unwrap_err();

    assert!(err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<GraphError>(), Some(GraphError::NetworkError(_)))));
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    let tokens = common::CountingTokens::new();
    let feed = common::feed_for(&server, tokens);

    Mock::given(method("GET"))
        .and(path(common::DELTA_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = feed.fetch_page(&feed.initial_url()).await;
    assert!(result.is_err());
}
