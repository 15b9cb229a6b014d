//! Snapshot store abstraction
//!
//! The snapshot store is the local, non-authoritative mirror of ledger
//! state: one document per hostel, keyed by name. It exists so reads do not
//! have to touch the ledger; it is refreshed wholesale by Save and patched
//! selectively after confirmed deletes. Implementations guarantee atomicity
//! per document operation, nothing across documents.

mod errors;
mod file;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::model::Hostel;

/// Document-level operations over the mirror.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace the document with this hostel's name.
    /// Replace means the whole document, never a field merge.
    async fn upsert_hostel(&self, hostel: &Hostel) -> StoreResult<()>;

    /// All hostel documents in stable order.
    async fn find_all_hostels(&self) -> StoreResult<Vec<Hostel>>;

    /// Remove the document with this name. Removing an absent document is
    /// a no-op.
    async fn delete_hostel(&self, name: &str) -> StoreResult<()>;

    /// Pull the room with this ledger id out of the named hostel document.
    async fn pull_room_from_hostel(&self, name: &str, room_id: u64) -> StoreResult<()>;

    /// Pull a wallet out of every room's occupant list across all
    /// documents.
    async fn pull_occupant_from_all_rooms(&self, wallet: &str) -> StoreResult<()>;

    /// Administrative reset: drop every document.
    async fn delete_all_hostels(&self) -> StoreResult<()>;
}
