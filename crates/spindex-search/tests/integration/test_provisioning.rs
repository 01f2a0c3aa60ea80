//! Integration tests for vertical provisioning and teardown

use spindex_core::domain::vertical::{DeletionStatus, ResourceKind, VerticalNames};
use spindex_search::VerticalOverrides;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, provision_ctx, API_KEY, API_VERSION};

/// Mounts a 200 for PUT on one resource path
async fn mount_upsert(server: &MockServer, resource_path: &str) {
    Mock::given(method("PUT"))
        .and(path(resource_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn upsert_sends_api_key_and_version() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/datasources/ds-spo"))
        .and(query_param("api-version", API_VERSION))
        .and(header("api-key", API_KEY))
        .and(body_partial_json(serde_json::json!({
            "name": "ds-spo",
            "type": "azureblob",
            "container": {"name": "spofiles"},
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .upsert_data_source("ds-spo", &provision_ctx())
        .await
        .expect("upsert failed");
}

#[tokio::test]
async fn create_vertical_provisions_all_four_and_starts_a_run() {
    let server = MockServer::start().await;
    mount_upsert(&server, "/datasources/ds-spo").await;
    mount_upsert(&server, "/indexes/idx-spo").await;
    mount_upsert(&server, "/skillsets/ss-spo").await;
    mount_upsert(&server, "/indexers/ix-spo").await;

    Mock::given(method("POST"))
        .and(path("/indexers/ix-spo/run"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let names = VerticalNames::for_prefix("spo").unwrap();
    let handle = client
        .create_vertical(&names, &provision_ctx(), &VerticalOverrides::default())
        .await
        .expect("provisioning failed");

    assert!(handle.run_started);
    assert_eq!(handle.names.index, "idx-spo");
}

#[tokio::test]
async fn create_vertical_tolerates_run_start_failure() {
    let server = MockServer::start().await;
    mount_upsert(&server, "/datasources/ds-spo").await;
    mount_upsert(&server, "/indexes/idx-spo").await;
    mount_upsert(&server, "/skillsets/ss-spo").await;
    mount_upsert(&server, "/indexers/ix-spo").await;

    // Conflict: an execution is already in flight. Not transient, no retry.
    Mock::given(method("POST"))
        .and(path("/indexers/ix-spo/run"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": {"message": "An indexer invocation is already in progress"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let names = VerticalNames::for_prefix("spo").unwrap();
    let handle = client
        .create_vertical(&names, &provision_ctx(), &VerticalOverrides::default())
        .await
        .expect("provisioning should survive a run-start failure");

    assert!(!handle.run_started);
}

#[tokio::test]
async fn create_vertical_stops_on_index_rejection() {
    let server = MockServer::start().await;
    mount_upsert(&server, "/datasources/ds-spo").await;

    Mock::given(method("PUT"))
        .and(path("/indexes/idx-spo"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "The field 'content_vector' is invalid"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let names = VerticalNames::for_prefix("spo").unwrap();
    let result = client
        .create_vertical(&names, &provision_ctx(), &VerticalOverrides::default())
        .await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("content_vector"));
    // Skillset and indexer must not have been attempted (no mounts for them,
    // wiremock would 404 and the upsert would report Provisioning).
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_vertical_reports_actual_server_outcomes() {
    let server = MockServer::start().await;

    for resource in ["/indexers/ix-spo", "/indexes/idx-spo", "/datasources/ds-spo"] {
        Mock::given(method("DELETE"))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    // The skillset was never created; absence still counts as success.
    Mock::given(method("DELETE"))
        .and(path("/skillsets/ss-spo"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let names = VerticalNames::for_prefix("spo").unwrap();
    let report = client.delete_vertical(&names).await;

    assert!(report.all_succeeded());
    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.entries[0].kind, ResourceKind::Indexer);
    assert_eq!(report.entries[0].outcome, DeletionStatus::Deleted);
    assert_eq!(report.entries[1].kind, ResourceKind::Skillset);
    assert_eq!(report.entries[1].outcome, DeletionStatus::NotFound);
    assert_eq!(report.entries[3].kind, ResourceKind::DataSource);
}

#[tokio::test]
async fn delete_vertical_keeps_going_after_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/indexers/ix-spo"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"message": "The api-key is not authorized"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    for resource in ["/skillsets/ss-spo", "/indexes/idx-spo", "/datasources/ds-spo"] {
        Mock::given(method("DELETE"))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let names = VerticalNames::for_prefix("spo").unwrap();
    let report = client.delete_vertical(&names).await;

    assert!(!report.all_succeeded());
    assert!(matches!(
        report.entries[0].outcome,
        DeletionStatus::Failed(_)
    ));
    assert_eq!(report.entries[1].outcome, DeletionStatus::Deleted);
    assert_eq!(report.entries[2].outcome, DeletionStatus::Deleted);
    assert_eq!(report.entries[3].outcome, DeletionStatus::Deleted);
}

#[tokio::test]
async fn indexer_status_is_parsed_from_the_service() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexers/ix-spo/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "running",
            "lastResult": {
                "status": "success",
                "startTime": "2024-05-01T12:00:00Z",
                "endTime": "2024-05-01T12:03:00Z",
                "itemsProcessed": 17,
                "itemsFailed": 2,
            },
            "executionHistory": [
                {"status": "success", "itemsProcessed": 17, "itemsFailed": 2},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let status = client
        .get_indexer_status("ix-spo")
        .await
        .expect("status fetch failed");

    assert_eq!(status.status, "running");
    let last = status.last_result.unwrap();
    assert_eq!(last.items_processed, 17);
    assert_eq!(last.items_failed, 2);
}

#[tokio::test]
async fn status_of_missing_indexer_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/indexers/ix-gone/status"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_indexer_status("ix-gone").await.unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
}

#[tokio::test]
async fn list_resources_collects_names_per_collection() {
    let server = MockServer::start().await;

    let collections = [
        ("/datasources", serde_json::json!({"value": [{"name": "ds-spo"}]})),
        ("/skillsets", serde_json::json!({"value": [{"name": "ss-spo"}]})),
        (
            "/indexes",
            serde_json::json!({"value": [{"name": "idx-spo"}, {"name": "idx-docs"}]}),
        ),
        ("/indexers", serde_json::json!({"value": []})),
    ];
    for (collection, body) in collections {
        Mock::given(method("GET"))
            .and(path(collection))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let inventory = client.list_resources().await.expect("listing failed");

    assert_eq!(inventory.data_sources, vec!["ds-spo"]);
    assert_eq!(inventory.skillsets, vec!["ss-spo"]);
    assert_eq!(inventory.indexes, vec!["idx-spo", "idx-docs"]);
    assert!(inventory.indexers.is_empty());
}

#[tokio::test]
async fn transient_service_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/datasources/ds-spo"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/datasources/ds-spo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .upsert_data_source("ds-spo", &provision_ctx())
        .await
        .expect("should succeed after retries");
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/indexes/idx-spo"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "Invalid index definition"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .upsert_index("idx-spo", &provision_ctx())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Invalid index definition"));
}
