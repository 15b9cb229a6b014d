//! Save / Restore Cycle Tests
//!
//! Save is mirror-only with whole-document replace semantics; a saved
//! snapshot then restores into the ledger; the administrative reset clears
//! the mirror without any ledger traffic. The file-backed store is driven
//! through a real temp directory.

use std::sync::Arc;

use hostelsync::ledger::{LedgerClient, MemoryLedger};
use hostelsync::model::{Hostel, Room};
use hostelsync::reconcile::SyncEngine;
use hostelsync::snapshot::{FileStore, MemoryStore, SnapshotStore};
use tempfile::TempDir;

fn room(id: &str, occupants: &[&str]) -> Room {
    Room {
        id: id.to_string(),
        capacity: "4".to_string(),
        available: Some(true),
        occupancy: None,
        occupants: occupants.iter().map(|s| s.to_string()).collect(),
    }
}

fn hostel(name: &str, rooms: Vec<Room>) -> Hostel {
    Hostel {
        name: name.to_string(),
        rooms,
    }
}

/// Saving the same hostel twice keeps one document holding the later
/// version wholesale, never a field merge.
#[tokio::test]
async fn test_save_replaces_whole_document() {
    let ledger = Arc::new(MemoryLedger::new("0xadmin"));
    let store = Arc::new(MemoryStore::new());
    let engine = SyncEngine::new(ledger.clone(), store.clone());

    engine
        .save(vec![hostel("Block-A", vec![room("1", &["0xAA"]), room("2", &[])])])
        .await
        .unwrap();
    engine
        .save(vec![hostel("Block-A", vec![room("3", &[])])])
        .await
        .unwrap();

    let docs = store.find_all_hostels().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].rooms.len(), 1);
    assert_eq!(docs[0].rooms[0].id, "3");
    // Save never talks to the ledger.
    assert!(ledger.calls().is_empty());
}

/// Full cycle against the file-backed store: save, restore, delete, with
/// the mirror surviving a reopen at every step.
#[tokio::test]
async fn test_save_restore_delete_cycle_with_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");

    let ledger = Arc::new(MemoryLedger::new("0xadmin"));
    let store = Arc::new(FileStore::open(&path).unwrap());
    let engine = SyncEngine::new(ledger.clone(), store.clone());

    engine
        .save(vec![
            hostel("Block-A", vec![room("1", &["0xAA"])]),
            hostel("Block-B", vec![room("1", &[])]),
        ])
        .await
        .unwrap();

    let report = engine.restore().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.hostels_created, 2);
    assert_eq!(ledger.room_ids_of("Block-A").await.unwrap(), vec![1]);

    engine.delete_room("Block-A", 1).await.unwrap();

    // The mirror patch is durable across a reopen.
    let reopened = FileStore::open(&path).unwrap();
    let docs = reopened.find_all_hostels().await.unwrap();
    let block_a = docs.iter().find(|d| d.name == "Block-A").unwrap();
    assert!(block_a.rooms.is_empty());
}

/// The administrative reset clears every document and leaves the ledger
/// alone.
#[tokio::test]
async fn test_reset_clears_mirror_only() {
    let ledger = Arc::new(MemoryLedger::new("0xadmin"));
    ledger.seed_hostel("Block-A", &[1]);
    let store = Arc::new(MemoryStore::with_hostels(vec![
        hostel("Block-A", vec![room("1", &[])]),
        hostel("Block-B", vec![]),
    ]));
    let engine = SyncEngine::new(ledger.clone(), store.clone());

    engine.reset_store().await.unwrap();

    assert!(store.find_all_hostels().await.unwrap().is_empty());
    assert_eq!(
        ledger.hostel_name_at(0).await.unwrap().as_deref(),
        Some("Block-A")
    );
    assert!(ledger.calls().is_empty());
}

/// A saved-then-restored snapshot reaches convergence: a follow-up run has
/// nothing left to create.
#[tokio::test]
async fn test_cycle_reaches_convergence() {
    let ledger = Arc::new(MemoryLedger::new("0xadmin"));
    let store = Arc::new(MemoryStore::new());
    let engine = SyncEngine::new(ledger.clone(), store.clone());

    engine
        .save(vec![hostel("Block-A", vec![room("1", &["0xAA", "0xBB"])])])
        .await
        .unwrap();
    engine.restore().await.unwrap();

    let again = engine.restore().await.unwrap();
    assert_eq!(again.hostels_created, 0);
    assert_eq!(again.rooms_created, 0);
    assert_eq!(again.students_registered, 0);
    assert!(again.is_clean());
}
