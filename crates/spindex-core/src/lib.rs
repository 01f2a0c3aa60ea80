//! spindex Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Configuration** - typed settings for the four external systems
//!   (SharePoint/Graph, Blob Storage, AI Search, OpenAI embeddings)
//! - **Domain types** - `SyncSummary`, `VerticalNames`, `DeletionReport`,
//!   validated newtypes (`DeltaCursor`, `BlobKey`, ...)
//! - **Port definitions** - Traits for adapters: `IChangeFeed`,
//!   `IObjectStore`, `ICursorStore`, `IAccessTokenProvider`
//! - **Retry policy** - explicit, injectable backoff policy for transient
//!   network failures
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod ports;
pub mod retry;
