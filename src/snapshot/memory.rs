//! In-memory snapshot store for tests

use std::sync::RwLock;

use async_trait::async_trait;

use crate::model::Hostel;

use super::errors::{StoreError, StoreResult};
use super::SnapshotStore;

/// Document set behind an RwLock, insertion order preserved.
pub struct MemoryStore {
    docs: RwLock<Vec<Hostel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Seed documents directly, bypassing upsert semantics.
    pub fn with_hostels(hostels: Vec<Hostel>) -> Self {
        Self {
            docs: RwLock::new(hostels),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn upsert_hostel(&self, hostel: &Hostel) -> StoreResult<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        match docs.iter_mut().find(|d| d.name == hostel.name) {
            Some(existing) => *existing = hostel.clone(),
            None => docs.push(hostel.clone()),
        }
        Ok(())
    }

    async fn find_all_hostels(&self) -> StoreResult<Vec<Hostel>> {
        Ok(self.docs.read().map_err(|_| poisoned())?.clone())
    }

    async fn delete_hostel(&self, name: &str) -> StoreResult<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.retain(|d| d.name != name);
        Ok(())
    }

    async fn pull_room_from_hostel(&self, name: &str, room_id: u64) -> StoreResult<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        if let Some(doc) = docs.iter_mut().find(|d| d.name == name) {
            doc.rooms.retain(|r| r.ledger_id() != Some(room_id));
        }
        Ok(())
    }

    async fn pull_occupant_from_all_rooms(&self, wallet: &str) -> StoreResult<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        for doc in docs.iter_mut() {
            for room in doc.rooms.iter_mut() {
                room.occupants.retain(|o| o != wallet);
            }
        }
        Ok(())
    }

    async fn delete_all_hostels(&self) -> StoreResult<()> {
        self.docs.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Room;

    fn hostel(name: &str, room_ids: &[&str]) -> Hostel {
        Hostel {
            name: name.to_string(),
            rooms: room_ids
                .iter()
                .map(|id| Room {
                    id: id.to_string(),
                    capacity: "4".to_string(),
                    available: Some(true),
                    occupancy: None,
                    occupants: vec!["0xAA".to_string()],
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let store = MemoryStore::new();
        store.upsert_hostel(&hostel("Block-A", &["1", "2"])).await.unwrap();
        store.upsert_hostel(&hostel("Block-A", &["3"])).await.unwrap();

        let docs = store.find_all_hostels().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].rooms.len(), 1);
        assert_eq!(docs[0].rooms[0].id, "3");
    }

    #[tokio::test]
    async fn test_pull_room_matches_ledger_id() {
        let store = MemoryStore::new();
        store.upsert_hostel(&hostel("Block-A", &["1", "2"])).await.unwrap();
        store.pull_room_from_hostel("Block-A", 1).await.unwrap();

        let docs = store.find_all_hostels().await.unwrap();
        assert_eq!(docs[0].rooms.len(), 1);
        assert_eq!(docs[0].rooms[0].id, "2");
    }

    #[tokio::test]
    async fn test_pull_occupant_spans_all_documents() {
        let store = MemoryStore::new();
        store.upsert_hostel(&hostel("Block-A", &["1"])).await.unwrap();
        store.upsert_hostel(&hostel("Block-B", &["1"])).await.unwrap();

        store.pull_occupant_from_all_rooms("0xAA").await.unwrap();

        for doc in store.find_all_hostels().await.unwrap() {
            assert!(doc.rooms[0].occupants.is_empty());
        }
    }

    #[tokio::test]
    async fn test_delete_absent_hostel_is_noop() {
        let store = MemoryStore::new();
        store.delete_hostel("Nowhere").await.unwrap();
        assert!(store.find_all_hostels().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_clears_every_document() {
        let store = MemoryStore::new();
        store.upsert_hostel(&hostel("Block-A", &["1"])).await.unwrap();
        store.upsert_hostel(&hostel("Block-B", &["1"])).await.unwrap();
        store.delete_all_hostels().await.unwrap();
        assert!(store.find_all_hostels().await.unwrap().is_empty());
    }
}
