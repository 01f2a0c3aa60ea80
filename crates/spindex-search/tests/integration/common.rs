//! Shared helpers for search integration tests

use spindex_core::retry::RetryPolicy;
use spindex_search::{ProvisionContext, SearchClient};
use wiremock::MockServer;

pub const API_KEY: &str = "admin-key";
pub const API_VERSION: &str = "2024-07-01";

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(2),
    }
}

pub fn client_for(server: &MockServer) -> SearchClient {
    SearchClient::new(server.uri(), API_KEY, API_VERSION).with_retry_policy(fast_retry())
}

pub fn provision_ctx() -> ProvisionContext {
    ProvisionContext {
        storage_connection_string: "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=k"
            .to_string(),
        container: "spofiles".to_string(),
        openai_endpoint: "https://aoai.openai.azure.com".to_string(),
        openai_api_key: "aoai-key".to_string(),
        embedding_deployment: "text-embedding-3-small".to_string(),
        embedding_dimensions: 1536,
    }
}
