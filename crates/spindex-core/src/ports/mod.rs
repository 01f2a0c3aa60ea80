//! Port definitions (trait interfaces for adapters)
//!
//! Ports define the boundaries between the domain core and the outside
//! world. Adapter crates (`spindex-graph`, `spindex-blob`) implement the
//! driven ports; use-case level code depends only on the traits.

pub mod change_feed;
pub mod cursor_store;
pub mod object_store;
pub mod token_provider;

pub use change_feed::{ChangeFeedPage, FeedItem, IChangeFeed};
pub use cursor_store::ICursorStore;
pub use object_store::{BlobMetadata, IObjectStore};
pub use token_provider::{IAccessTokenProvider, Tokens};
