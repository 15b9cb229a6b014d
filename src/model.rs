//! Snapshot document model
//!
//! Mirrors the shape of the documents held by the snapshot store: one
//! document per hostel, each owning an ordered list of room records.
//! Numeric room fields travel as strings because the mirror inherits the
//! loosely-typed documents produced by the UI layer; parsing happens here,
//! once, with explicit failure modes.

use serde::{Deserialize, Serialize};

/// Sentinel address marking an empty occupant slot on the ledger.
///
/// Entries equal to this (or blank) are filtered out of every count,
/// registration, and allocation.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A hostel document as stored in the snapshot mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostel {
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// A room record inside a hostel document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub occupancy: Option<String>,
    #[serde(default)]
    pub occupants: Vec<String>,
}

impl Hostel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
        }
    }
}

impl Room {
    /// Parse the room id into the integer form the ledger uses.
    pub fn ledger_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }

    /// Occupants with empty-slot sentinels removed, deduplicated,
    /// original order preserved.
    pub fn live_occupants(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for occupant in &self.occupants {
            if occupant.is_empty() || occupant == ZERO_ADDRESS {
                continue;
            }
            if !seen.contains(occupant) {
                seen.push(occupant.clone());
            }
        }
        seen
    }

    /// Occupancy to replay to the ledger.
    ///
    /// The explicit field wins when it parses to a nonzero integer;
    /// otherwise the live occupant count is used. A stored "0" therefore
    /// falls back to the recomputed length, matching the source system.
    pub fn derived_occupancy(&self) -> u64 {
        self.occupancy
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(|| self.live_occupants().len() as u64)
    }

    /// Availability flag, defaulting to true when the document omits it.
    pub fn is_available(&self) -> bool {
        self.available.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_occupants(occupants: &[&str]) -> Room {
        Room {
            id: "1".to_string(),
            capacity: "4".to_string(),
            available: Some(true),
            occupancy: None,
            occupants: occupants.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_ledger_id_parses_decimal_string() {
        let room = room_with_occupants(&[]);
        assert_eq!(room.ledger_id(), Some(1));
    }

    #[test]
    fn test_ledger_id_rejects_non_integer() {
        let mut room = room_with_occupants(&[]);
        room.id = "first".to_string();
        assert_eq!(room.ledger_id(), None);
    }

    #[test]
    fn test_live_occupants_filters_zero_address() {
        let room = room_with_occupants(&["0xAA", ZERO_ADDRESS, "0xBB", ""]);
        assert_eq!(room.live_occupants(), vec!["0xAA", "0xBB"]);
    }

    #[test]
    fn test_live_occupants_deduplicates_preserving_order() {
        let room = room_with_occupants(&["0xBB", "0xAA", "0xBB"]);
        assert_eq!(room.live_occupants(), vec!["0xBB", "0xAA"]);
    }

    #[test]
    fn test_occupancy_prefers_explicit_nonzero_field() {
        let mut room = room_with_occupants(&["0xAA"]);
        room.occupancy = Some("3".to_string());
        assert_eq!(room.derived_occupancy(), 3);
    }

    #[test]
    fn test_occupancy_zero_falls_back_to_live_count() {
        let mut room = room_with_occupants(&["0xAA", "0xBB"]);
        room.occupancy = Some("0".to_string());
        assert_eq!(room.derived_occupancy(), 2);
    }

    #[test]
    fn test_occupancy_unparseable_falls_back_to_live_count() {
        let mut room = room_with_occupants(&["0xAA", ZERO_ADDRESS]);
        room.occupancy = Some("full".to_string());
        assert_eq!(room.derived_occupancy(), 1);
    }

    #[test]
    fn test_availability_defaults_to_true() {
        let mut room = room_with_occupants(&[]);
        room.available = None;
        assert!(room.is_available());
        room.available = Some(false);
        assert!(!room.is_available());
    }

    #[test]
    fn test_hostel_document_roundtrip() {
        let json = r#"{"name":"Block-A","rooms":[{"id":"1","capacity":"4","available":true,"occupancy":"2","occupants":["0xAA"]}]}"#;
        let hostel: Hostel = serde_json::from_str(json).unwrap();
        assert_eq!(hostel.name, "Block-A");
        assert_eq!(hostel.rooms.len(), 1);
        assert_eq!(hostel.rooms[0].derived_occupancy(), 2);
    }

    #[test]
    fn test_hostel_document_tolerates_missing_rooms() {
        let hostel: Hostel = serde_json::from_str(r#"{"name":"Block-B"}"#).unwrap();
        assert!(hostel.rooms.is_empty());
    }
}
