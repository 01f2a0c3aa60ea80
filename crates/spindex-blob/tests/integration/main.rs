//! Integration tests for spindex-blob
//!
//! Uses wiremock to simulate the Azure Blob Storage REST API.

mod test_store;
