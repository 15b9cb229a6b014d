//! Ledger read-model types

use serde::Serialize;

/// Room state as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomInfo {
    pub id: u64,
    pub capacity: u64,
    pub available: bool,
    pub occupancy: u64,
    pub occupants: Vec<String>,
}

/// Student state as reported by the ledger.
///
/// A student holds at most one confirmed allocation and at most one pending
/// (not yet admin-approved) allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentInfo {
    pub registered: bool,
    pub hostel: Option<String>,
    pub room: Option<u64>,
    pub pending_hostel: Option<String>,
    pub pending_room: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_info_default_is_unregistered() {
        let info = StudentInfo::default();
        assert!(!info.registered);
        assert!(info.hostel.is_none());
        assert!(info.pending_hostel.is_none());
    }
}
