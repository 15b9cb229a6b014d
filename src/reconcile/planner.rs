//! Diff & ordering planner
//!
//! Pure snapshot-side preparation for a restore run: deduplicate hostel
//! documents, collect the occupant set that must be registered before any
//! allocation, and normalize each room into the payload the ledger calls
//! expect. No I/O happens here; ledger-side membership checks stay in the
//! engine because they must be re-read as the run mutates the ledger.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{Hostel, Room};

/// Planner-level failure for a single room.
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    #[error("room id {0:?} is not an integer")]
    UnparseableRoomId(String),
}

/// Deduplicated snapshot hostels.
#[derive(Debug)]
pub struct DedupResult {
    pub hostels: Vec<Hostel>,
    pub dropped: usize,
}

/// Keep the first document per hostel name, in snapshot order.
///
/// Duplicates guard against a corrupted or concurrently-written snapshot;
/// the first occurrence's room list wins.
pub fn dedup_hostels(hostels: Vec<Hostel>) -> DedupResult {
    let mut seen = BTreeSet::new();
    let mut kept = Vec::new();
    let mut dropped = 0;
    for hostel in hostels {
        if seen.insert(hostel.name.clone()) {
            kept.push(hostel);
        } else {
            dropped += 1;
        }
    }
    DedupResult {
        hostels: kept,
        dropped,
    }
}

/// All occupants referenced by any room in any hostel, sentinel slots
/// excluded. Registration order is not significant; the sorted set keeps
/// runs deterministic.
pub fn collect_occupants(hostels: &[Hostel]) -> BTreeSet<String> {
    let mut occupants = BTreeSet::new();
    for hostel in hostels {
        for room in &hostel.rooms {
            occupants.extend(room.live_occupants());
        }
    }
    occupants
}

/// Ledger payload for one room's creation and state restoration.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRestore {
    pub room_id: u64,
    pub occupants: Vec<String>,
    pub occupancy: u64,
    pub available: bool,
}

/// Normalize a snapshot room into its restore payload.
pub fn clean_room(room: &Room) -> Result<RoomRestore, PlanError> {
    let room_id = room
        .ledger_id()
        .ok_or_else(|| PlanError::UnparseableRoomId(room.id.clone()))?;
    Ok(RoomRestore {
        room_id,
        occupants: room.live_occupants(),
        occupancy: room.derived_occupancy(),
        available: room.is_available(),
    })
}
