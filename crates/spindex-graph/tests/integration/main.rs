//! Integration tests for spindex-graph
//!
//! Uses wiremock to simulate the Microsoft Graph API and verifies
//! end-to-end behavior of the change feed: delta pages, pagination,
//! downloads, and the 401 refresh-and-retry contract.

mod common;

mod test_feed;
