//! Cursor store port (driven/secondary port)
//!
//! Interface for persisting the delta cursor between sync runs. The cursor
//! is the engine's only durable state: absence means FRESH (full traversal),
//! presence means INCREMENTAL (resume from the stored cursor).

use crate::domain::newtypes::DeltaCursor;

/// Port trait for durable cursor storage
///
/// Implementations must only be handed a cursor after the page it terminates
/// has been fully applied; the engine enforces that ordering, the store just
/// persists what it is given.
#[async_trait::async_trait]
pub trait ICursorStore: Send + Sync {
    /// Load the persisted cursor, or `None` when no run has completed yet
    async fn load(&self) -> anyhow::Result<Option<DeltaCursor>>;

    /// Persist the terminal cursor of a completed run
    async fn store(&self, cursor: &DeltaCursor) -> anyhow::Result<()>;
}
