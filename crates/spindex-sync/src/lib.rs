//! Spindex Sync - delta sync engine
//!
//! Drives the change feed, mirrors file content into the object store, and
//! persists the resumption cursor. The engine is written entirely against
//! the core ports, so everything here is testable with in-memory fakes.
//!
//! ## Modules
//!
//! - [`key`] - blob key derivation from feed paths
//! - [`cursor`] - file-backed cursor store
//! - [`mirror`] - per-item content mirroring
//! - [`engine`] - the page-by-page sync loop

pub mod cursor;
pub mod engine;
pub mod key;
pub mod mirror;

pub use cursor::FileCursorStore;
pub use engine::SyncEngine;
pub use mirror::{ContentMirror, MirrorError};
