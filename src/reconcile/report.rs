//! Restore run reporting
//!
//! A restore run never hides partial failure: every per-item failure is
//! recorded with the entity and stage it hit, so an operator can replay
//! exactly what is missing.

use serde::Serialize;
use uuid::Uuid;

/// Stage of the restore pipeline a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Registration,
    HostelCreation,
    RoomCreation,
    RoomState,
    Allocation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Registration => "registration",
            Stage::HostelCreation => "hostel_creation",
            Stage::RoomCreation => "room_creation",
            Stage::RoomState => "room_state",
            Stage::Allocation => "allocation",
        }
    }
}

/// One isolated per-item failure.
#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<String>,
    pub reason: String,
}

/// Summary of one restore run.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub run_id: Uuid,
    pub started_at: String,
    pub hostels_processed: usize,
    pub hostels_created: usize,
    pub rooms_created: usize,
    pub students_registered: usize,
    pub room_states_restored: usize,
    pub allocations_restored: usize,
    pub duplicates_dropped: usize,
    /// Set when hostel enumeration ended on a probe failure rather than a
    /// clean end of list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_warning: Option<String>,
    pub failures: Vec<StageFailure>,
}

impl RestoreReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: chrono::Utc::now().to_rfc3339(),
            hostels_processed: 0,
            hostels_created: 0,
            rooms_created: 0,
            students_registered: 0,
            room_states_restored: 0,
            allocations_restored: 0,
            duplicates_dropped: 0,
            enumeration_warning: None,
            failures: Vec::new(),
        }
    }

    /// True when the run performed no work because the snapshot was empty.
    pub fn is_empty_run(&self) -> bool {
        self.hostels_processed == 0
    }

    /// True when the run completed without any per-item failure.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_failure(
        &mut self,
        stage: Stage,
        hostel: Option<&str>,
        room: Option<&str>,
        occupant: Option<&str>,
        reason: impl ToString,
    ) {
        self.failures.push(StageFailure {
            stage,
            hostel: hostel.map(str::to_string),
            room: room.map(str::to_string),
            occupant: occupant.map(str::to_string),
            reason: reason.to_string(),
        });
    }
}

impl Default for RestoreReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty_and_clean() {
        let report = RestoreReport::new();
        assert!(report.is_empty_run());
        assert!(report.is_clean());
    }

    #[test]
    fn test_recorded_failure_carries_context() {
        let mut report = RestoreReport::new();
        report.record_failure(
            Stage::RoomCreation,
            Some("Block-A"),
            Some("2"),
            None,
            "Room already exists",
        );
        assert!(!report.is_clean());
        let failure = &report.failures[0];
        assert_eq!(failure.stage, Stage::RoomCreation);
        assert_eq!(failure.hostel.as_deref(), Some("Block-A"));
        assert_eq!(failure.room.as_deref(), Some("2"));
    }

    #[test]
    fn test_report_serializes_stage_as_snake_case() {
        let mut report = RestoreReport::new();
        report.record_failure(Stage::HostelCreation, Some("Block-A"), None, None, "x");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["stage"], "hostel_creation");
        // Absent entity fields are omitted, not null.
        assert!(json["failures"][0].get("occupant").is_none());
    }
}
