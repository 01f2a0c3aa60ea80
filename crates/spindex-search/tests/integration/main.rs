//! Integration tests for spindex-search
//!
//! Uses wiremock to stand in for the search service management API.

mod common;
mod test_provisioning;
