//! JSON-file-backed snapshot store
//!
//! Persists the whole document set as one JSON array. Every mutation
//! rewrites the file through a temp-file/rename replace with fsync on the
//! file and its parent directory, so a crash leaves either the old set or
//! the new set, never a torn file. The in-memory copy is only updated
//! after the rewrite lands.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::model::Hostel;

use super::errors::{StoreError, StoreResult};
use super::SnapshotStore;

/// Snapshot mirror persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    docs: RwLock<Vec<Hostel>>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing document set.
    /// A missing file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let docs = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Vec::new()
        };
        Ok(Self {
            path,
            docs: RwLock::new(docs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fsync_dir(dir: &Path) -> StoreResult<()> {
        let d = OpenOptions::new().read(true).open(dir)?;
        d.sync_all()?;
        Ok(())
    }

    /// Write the document set to a sibling temp file, fsync it, then
    /// rename it over the live file and fsync the parent directory.
    fn persist(&self, docs: &[Hostel]) -> StoreResult<()> {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(docs)?.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp, &self.path)?;
        if !parent.as_os_str().is_empty() {
            Self::fsync_dir(parent)?;
        }
        Ok(())
    }

    fn mutate<F>(&self, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Vec<Hostel>),
    {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        let mut next = docs.clone();
        apply(&mut next);
        self.persist(&next)?;
        *docs = next;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn upsert_hostel(&self, hostel: &Hostel) -> StoreResult<()> {
        self.mutate(|docs| match docs.iter_mut().find(|d| d.name == hostel.name) {
            Some(existing) => *existing = hostel.clone(),
            None => docs.push(hostel.clone()),
        })
    }

    async fn find_all_hostels(&self) -> StoreResult<Vec<Hostel>> {
        Ok(self
            .docs
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?
            .clone())
    }

    async fn delete_hostel(&self, name: &str) -> StoreResult<()> {
        self.mutate(|docs| docs.retain(|d| d.name != name))
    }

    async fn pull_room_from_hostel(&self, name: &str, room_id: u64) -> StoreResult<()> {
        self.mutate(|docs| {
            if let Some(doc) = docs.iter_mut().find(|d| d.name == name) {
                doc.rooms.retain(|r| r.ledger_id() != Some(room_id));
            }
        })
    }

    async fn pull_occupant_from_all_rooms(&self, wallet: &str) -> StoreResult<()> {
        self.mutate(|docs| {
            for doc in docs.iter_mut() {
                for room in doc.rooms.iter_mut() {
                    room.occupants.retain(|o| o != wallet);
                }
            }
        })
    }

    async fn delete_all_hostels(&self) -> StoreResult<()> {
        self.mutate(|docs| docs.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Room;
    use tempfile::TempDir;

    fn hostel(name: &str) -> Hostel {
        Hostel {
            name: name.to_string(),
            rooms: vec![Room {
                id: "1".to_string(),
                capacity: "4".to_string(),
                available: Some(true),
                occupancy: Some("1".to_string()),
                occupants: vec!["0xAA".to_string()],
            }],
        }
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("snapshot.json")).unwrap();
        assert!(store.find_all_hostels().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");

        let store = FileStore::open(&path).unwrap();
        store.upsert_hostel(&hostel("Block-A")).await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let docs = reopened.find_all_hostels().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "Block-A");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");

        let store = FileStore::open(&path).unwrap();
        store.upsert_hostel(&hostel("Block-A")).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_pull_and_reset_persist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");

        let store = FileStore::open(&path).unwrap();
        store.upsert_hostel(&hostel("Block-A")).await.unwrap();
        store.pull_room_from_hostel("Block-A", 1).await.unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.find_all_hostels().await.unwrap()[0].rooms.is_empty());

        store.delete_all_hostels().await.unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.find_all_hostels().await.unwrap().is_empty());
    }
}
