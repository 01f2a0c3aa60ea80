//! Integration tests for the block-blob store
//!
//! Verifies upload headers, metadata propagation, SAS query handling,
//! JSON sidecar uploads, and retry behavior.

use spindex_blob::{AzureBlobStore, BlobCredential, BlobError};
use spindex_core::domain::newtypes::BlobKey;
use spindex_core::ports::{BlobMetadata, IObjectStore};
use spindex_core::retry::RetryPolicy;
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(2),
    }
}

fn store_for(server: &MockServer) -> AzureBlobStore {
    AzureBlobStore::new(
        server.uri(),
        "spofiles",
        BlobCredential::Sas("sv=2024&sig=test".to_string()),
    )
    .with_retry_policy(fast_retry())
}

#[tokio::test]
async fn put_object_sends_block_blob_headers_and_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/spofiles/Reports/q1.docx"))
        .and(query_param("sv", "2024"))
        .and(header("x-ms-blob-type", "BlockBlob"))
        .and(header("x-ms-meta-source_url", "https://contoso/q1.docx"))
        .and(header("x-ms-meta-sp_etag", "\"1\""))
        .and(body_bytes(b"document-bytes".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let key = BlobKey::new("Reports/q1.docx".to_string()).unwrap();
    let metadata: BlobMetadata = [
        ("Source_URL", "https://contoso/q1.docx"),
        ("SP_ETag", "\"1\""),
    ]
    .into_iter()
    .collect();

    store
        .put_object(&key, b"document-bytes".to_vec(), &metadata)
        .await
        .expect("upload failed");
}

#[tokio::test]
async fn put_json_uses_json_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/spofiles/Reports/q1.docx.json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let key = BlobKey::new("Reports/q1.docx".to_string()).unwrap().sidecar();
    let sidecar = serde_json::json!({"name": "q1.docx", "size": 14});

    store.put_json(&key, &sidecar).await.expect("upload failed");
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/spofiles/a.txt"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/spofiles/a.txt"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let key = BlobKey::new("a.txt".to_string()).unwrap();
    store
        .put_object(&key, b"x".to_vec(), &BlobMetadata::new())
        .await
        .expect("upload should succeed after retries");
}

#[tokio::test]
async fn forbidden_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/spofiles/a.txt"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let key = BlobKey::new("a.txt".to_string()).unwrap();
    let result = store
        .put_object(&key, b"x".to_vec(), &BlobMetadata::new())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn connection_failure_surfaces_as_network_error() {
    // Nothing listens on port 1, so every attempt is refused.
    let store = AzureBlobStore::new(
        "http://127.0.0.1:1",
        "spofiles",
        BlobCredential::Sas("sv=2024&sig=test".to_string()),
    )
    .with_retry_policy(fast_retry());

    let key = BlobKey::new("a.txt".to_string()).unwrap();
    let err = store
        .put_object(&key, b"x".to_vec(), &BlobMetadata::new())
        .await
        .unwrap_err();

    assert!(err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<BlobError>(), Some(BlobError::NetworkError(_)))));
}

#[tokio::test]
async fn nested_keys_map_to_nested_blob_paths() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/spofiles/A/B/C/file.txt"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let key = BlobKey::new("A/B/C/file.txt".to_string()).unwrap();
    store
        .put_object(&key, b"x".to_vec(), &BlobMetadata::new())
        .await
        .expect("upload failed");
}
