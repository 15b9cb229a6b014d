//! In-memory ledger
//!
//! Implements the same observable contract as the chain-backed client:
//! creation calls revert when the target already exists, allocation
//! restoration reverts for unregistered students, and room-state
//! restoration is a wholesale replace. Used by the test suite and as the
//! backend when the service runs without a chain endpoint.
//!
//! Every submission and confirmation is recorded in an inspectable call
//! log, and failures can be injected by call descriptor, so tests can
//! assert not just final state but the exact order of ledger traffic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::client::{LedgerClient, PendingCall};
use super::errors::{LedgerError, LedgerResult};
use super::types::{RoomInfo, StudentInfo};

const DEFAULT_ROOM_CAPACITY: u64 = 4;

#[derive(Debug, Clone)]
struct LedgerRoom {
    capacity: u64,
    available: bool,
    occupancy: u64,
    occupants: Vec<String>,
}

impl LedgerRoom {
    fn empty() -> Self {
        Self {
            capacity: DEFAULT_ROOM_CAPACITY,
            available: true,
            occupancy: 0,
            occupants: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerStudent {
    registered: bool,
    hostel: Option<String>,
    room: Option<u64>,
    pending_hostel: Option<String>,
    pending_room: Option<u64>,
}

#[derive(Default)]
struct Inner {
    hostel_names: Vec<String>,
    rooms: HashMap<String, BTreeMap<u64, LedgerRoom>>,
    students: HashMap<String, LedgerStudent>,
    admins: HashSet<String>,
    calls: Vec<String>,
    fail_on: Vec<(String, String)>,
    hang_confirm_on: Vec<String>,
    unavailable: bool,
}

/// In-memory [`LedgerClient`] bound to a single signer.
pub struct MemoryLedger {
    signer: String,
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    /// Create a ledger whose signer is seeded as an admin.
    pub fn new(signer: impl Into<String>) -> Self {
        let signer = signer.into();
        let mut inner = Inner::default();
        inner.admins.insert(signer.clone());
        Self {
            signer,
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger state lock poisoned".to_string()))
    }

    /// Seed a hostel with empty rooms, bypassing the call log.
    pub fn seed_hostel(&self, name: &str, room_ids: &[u64]) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.hostel_names.iter().any(|n| n == name) {
            inner.hostel_names.push(name.to_string());
        }
        let rooms = inner.rooms.entry(name.to_string()).or_default();
        for id in room_ids {
            rooms.entry(*id).or_insert_with(LedgerRoom::empty);
        }
    }

    /// Seed a registered student, bypassing the call log.
    pub fn seed_student(&self, wallet: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.students.entry(wallet.to_string()).or_default().registered = true;
    }

    pub fn promote_admin(&self, wallet: &str) {
        self.inner.lock().unwrap().admins.insert(wallet.to_string());
    }

    pub fn demote_admin(&self, wallet: &str) {
        self.inner.lock().unwrap().admins.remove(wallet);
    }

    /// Make every call whose descriptor starts with `prefix` revert.
    pub fn fail_on(&self, prefix: &str, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_on
            .push((prefix.to_string(), reason.to_string()));
    }

    /// Make confirmation stall for calls whose descriptor starts with
    /// `prefix`, so callers exercise their confirmation timeout.
    pub fn hang_confirm_on(&self, prefix: &str) {
        self.inner
            .lock()
            .unwrap()
            .hang_confirm_on
            .push(prefix.to_string());
    }

    /// Simulate the endpoint being unreachable for every call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    /// Full call log: `submit:`, `confirm:`, and `revert:` entries in
    /// submission order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Number of successfully submitted mutating calls.
    pub fn mutation_submits(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with("submit:"))
            .count()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Position of the first log entry matching `kind:descriptor`, if any.
    pub fn call_position(&self, entry_prefix: &str) -> Option<usize> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .position(|c| c.starts_with(entry_prefix))
    }

    fn check_read(&self, inner: &Inner, descriptor: &str) -> LedgerResult<()> {
        if inner.unavailable {
            return Err(LedgerError::Unavailable(
                "ledger endpoint unreachable".to_string(),
            ));
        }
        for (prefix, reason) in &inner.fail_on {
            if descriptor.starts_with(prefix.as_str()) {
                return Err(LedgerError::reverted(reason.clone()));
            }
        }
        Ok(())
    }

    /// Gate, record, and hand back a pending handle for a mutating call.
    /// The state mutation itself runs in `apply` after the gates pass.
    fn submit<F>(&self, descriptor: String, apply: F) -> LedgerResult<PendingCall>
    where
        F: FnOnce(&mut Inner) -> LedgerResult<()>,
    {
        let mut inner = self.lock()?;
        if inner.unavailable {
            return Err(LedgerError::Unavailable(
                "ledger endpoint unreachable".to_string(),
            ));
        }
        let injected = inner
            .fail_on
            .iter()
            .find(|(prefix, _)| descriptor.starts_with(prefix.as_str()))
            .map(|(_, reason)| reason.clone());
        if let Some(reason) = injected {
            inner.calls.push(format!("revert:{}", descriptor));
            return Err(LedgerError::reverted(reason));
        }
        if let Err(e) = apply(&mut inner) {
            inner.calls.push(format!("revert:{}", descriptor));
            return Err(e);
        }
        inner.calls.push(format!("submit:{}", descriptor));
        Ok(PendingCall::new(descriptor, Uuid::new_v4().to_string()))
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    fn signer(&self) -> &str {
        &self.signer
    }

    async fn is_admin(&self, identity: &str) -> LedgerResult<bool> {
        let inner = self.lock()?;
        self.check_read(&inner, &format!("admins({})", identity))?;
        Ok(inner.admins.contains(identity))
    }

    async fn hostel_name_at(&self, index: u64) -> LedgerResult<Option<String>> {
        let inner = self.lock()?;
        self.check_read(&inner, &format!("hostelNames({})", index))?;
        Ok(inner.hostel_names.get(index as usize).cloned())
    }

    async fn room_ids_of(&self, hostel: &str) -> LedgerResult<Vec<u64>> {
        let inner = self.lock()?;
        self.check_read(&inner, &format!("getHostelRoomIds({})", hostel))?;
        Ok(inner
            .rooms
            .get(hostel)
            .map(|rooms| rooms.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn room_info(&self, hostel: &str, room_id: u64) -> LedgerResult<RoomInfo> {
        let inner = self.lock()?;
        self.check_read(&inner, &format!("getRoomInfo({},{})", hostel, room_id))?;
        let room = inner
            .rooms
            .get(hostel)
            .and_then(|rooms| rooms.get(&room_id))
            .ok_or_else(|| LedgerError::reverted("Room does not exist"))?;
        Ok(RoomInfo {
            id: room_id,
            capacity: room.capacity,
            available: room.available,
            occupancy: room.occupancy,
            occupants: room.occupants.clone(),
        })
    }

    async fn student_info(&self, wallet: &str) -> LedgerResult<StudentInfo> {
        let inner = self.lock()?;
        self.check_read(&inner, &format!("students({})", wallet))?;
        let student = inner.students.get(wallet).cloned().unwrap_or_default();
        Ok(StudentInfo {
            registered: student.registered,
            hostel: student.hostel,
            room: student.room,
            pending_hostel: student.pending_hostel,
            pending_room: student.pending_room,
        })
    }

    async fn is_registered(&self, wallet: &str) -> LedgerResult<bool> {
        let inner = self.lock()?;
        self.check_read(&inner, &format!("students({})", wallet))?;
        Ok(inner
            .students
            .get(wallet)
            .map(|s| s.registered)
            .unwrap_or(false))
    }

    async fn register_student(&self, wallet: &str) -> LedgerResult<PendingCall> {
        let wallet = wallet.to_string();
        self.submit(format!("registerStudent({})", wallet), move |inner| {
            let student = inner.students.entry(wallet.clone()).or_default();
            if student.registered {
                return Err(LedgerError::reverted("Student already registered"));
            }
            student.registered = true;
            Ok(())
        })
    }

    async fn add_hostel(&self, name: &str) -> LedgerResult<PendingCall> {
        let name = name.to_string();
        self.submit(format!("addHostel({})", name), move |inner| {
            if inner.hostel_names.iter().any(|n| *n == name) {
                return Err(LedgerError::reverted("Hostel already exists"));
            }
            inner.hostel_names.push(name.clone());
            inner.rooms.insert(name.clone(), BTreeMap::new());
            Ok(())
        })
    }

    async fn add_room(&self, hostel: &str, room_id: u64) -> LedgerResult<PendingCall> {
        let hostel = hostel.to_string();
        self.submit(format!("addRoom({},{})", hostel, room_id), move |inner| {
            let rooms = inner
                .rooms
                .get_mut(&hostel)
                .ok_or_else(|| LedgerError::reverted("Hostel does not exist"))?;
            if rooms.contains_key(&room_id) {
                return Err(LedgerError::reverted("Room already exists"));
            }
            rooms.insert(room_id, LedgerRoom::empty());
            Ok(())
        })
    }

    async fn restore_room_occupants(
        &self,
        hostel: &str,
        room_id: u64,
        occupants: &[String],
        occupancy: u64,
        available: bool,
    ) -> LedgerResult<PendingCall> {
        let hostel = hostel.to_string();
        let occupants = occupants.to_vec();
        self.submit(
            format!("restoreRoomOccupants({},{})", hostel, room_id),
            move |inner| {
                let room = inner
                    .rooms
                    .get_mut(&hostel)
                    .and_then(|rooms| rooms.get_mut(&room_id))
                    .ok_or_else(|| LedgerError::reverted("Room does not exist"))?;
                room.occupants = occupants;
                room.occupancy = occupancy;
                room.available = available;
                Ok(())
            },
        )
    }

    async fn restore_student_allocation(
        &self,
        wallet: &str,
        hostel: &str,
        room_id: u64,
    ) -> LedgerResult<PendingCall> {
        let wallet = wallet.to_string();
        let hostel = hostel.to_string();
        self.submit(
            format!("restoreStudentAllocation({},{},{})", wallet, hostel, room_id),
            move |inner| {
                let student = inner
                    .students
                    .get_mut(&wallet)
                    .filter(|s| s.registered)
                    .ok_or_else(|| LedgerError::reverted("Student not registered"))?;
                student.hostel = Some(hostel.clone());
                student.room = Some(room_id);
                Ok(())
            },
        )
    }

    async fn delete_hostel(&self, name: &str) -> LedgerResult<PendingCall> {
        let name = name.to_string();
        self.submit(format!("deleteHostel({})", name), move |inner| {
            if !inner.hostel_names.iter().any(|n| *n == name) {
                return Err(LedgerError::reverted("Hostel does not exist"));
            }
            inner.hostel_names.retain(|n| *n != name);
            inner.rooms.remove(&name);
            Ok(())
        })
    }

    async fn delete_room(&self, hostel: &str, room_id: u64) -> LedgerResult<PendingCall> {
        let hostel = hostel.to_string();
        self.submit(format!("deleteRoom({},{})", hostel, room_id), move |inner| {
            let rooms = inner
                .rooms
                .get_mut(&hostel)
                .ok_or_else(|| LedgerError::reverted("Hostel does not exist"))?;
            if rooms.remove(&room_id).is_none() {
                return Err(LedgerError::reverted("Room does not exist"));
            }
            Ok(())
        })
    }

    async fn delete_student(&self, wallet: &str) -> LedgerResult<PendingCall> {
        let wallet = wallet.to_string();
        self.submit(format!("deleteStudent({})", wallet), move |inner| {
            if inner
                .students
                .remove(&wallet)
                .filter(|s| s.registered)
                .is_none()
            {
                return Err(LedgerError::reverted("Student not registered"));
            }
            for rooms in inner.rooms.values_mut() {
                for room in rooms.values_mut() {
                    let before = room.occupants.len();
                    room.occupants.retain(|o| *o != wallet);
                    let removed = (before - room.occupants.len()) as u64;
                    room.occupancy = room.occupancy.saturating_sub(removed);
                }
            }
            Ok(())
        })
    }

    async fn delete_admin(&self, wallet: &str) -> LedgerResult<PendingCall> {
        let wallet = wallet.to_string();
        self.submit(format!("deleteAdmin({})", wallet), move |inner| {
            if !inner.admins.remove(&wallet) {
                return Err(LedgerError::reverted("Not an admin"));
            }
            Ok(())
        })
    }

    async fn confirm(&self, pending: PendingCall) -> LedgerResult<()> {
        let hang = {
            let inner = self.lock()?;
            if inner.unavailable {
                return Err(LedgerError::Unavailable(
                    "ledger endpoint unreachable".to_string(),
                ));
            }
            inner
                .hang_confirm_on
                .iter()
                .any(|prefix| pending.call.starts_with(prefix.as_str()))
        };
        if hang {
            // Never resolves within any sane confirmation timeout.
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let mut inner = self.lock()?;
        inner.calls.push(format!("confirm:{}", pending.call));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_hostel_then_duplicate_reverts() {
        let ledger = MemoryLedger::new("0xadmin");
        let pending = ledger.add_hostel("Block-A").await.unwrap();
        ledger.confirm(pending).await.unwrap();

        let err = ledger.add_hostel("Block-A").await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_add_room_requires_hostel() {
        let ledger = MemoryLedger::new("0xadmin");
        let err = ledger.add_room("Nowhere", 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Hostel does not exist");
    }

    #[tokio::test]
    async fn test_restore_room_occupants_replaces_wholesale() {
        let ledger = MemoryLedger::new("0xadmin");
        ledger.seed_hostel("Block-A", &[1]);

        let occupants = vec!["0xAA".to_string(), "0xBB".to_string()];
        let p = ledger
            .restore_room_occupants("Block-A", 1, &occupants, 2, true)
            .await
            .unwrap();
        ledger.confirm(p).await.unwrap();

        let info = ledger.room_info("Block-A", 1).await.unwrap();
        assert_eq!(info.occupants, occupants);
        assert_eq!(info.occupancy, 2);

        // Replaying the same payload leaves state unchanged.
        let p = ledger
            .restore_room_occupants("Block-A", 1, &occupants, 2, true)
            .await
            .unwrap();
        ledger.confirm(p).await.unwrap();
        assert_eq!(ledger.room_info("Block-A", 1).await.unwrap().occupants, occupants);
    }

    #[tokio::test]
    async fn test_allocation_requires_registration() {
        let ledger = MemoryLedger::new("0xadmin");
        ledger.seed_hostel("Block-A", &[1]);

        let err = ledger
            .restore_student_allocation("0xAA", "Block-A", 1)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Student not registered");

        ledger.seed_student("0xAA");
        let p = ledger
            .restore_student_allocation("0xAA", "Block-A", 1)
            .await
            .unwrap();
        ledger.confirm(p).await.unwrap();

        let info = ledger.student_info("0xAA").await.unwrap();
        assert_eq!(info.hostel.as_deref(), Some("Block-A"));
        assert_eq!(info.room, Some(1));
    }

    #[tokio::test]
    async fn test_delete_student_pulls_from_rooms() {
        let ledger = MemoryLedger::new("0xadmin");
        ledger.seed_hostel("Block-A", &[1]);
        ledger.seed_student("0xAA");
        let occupants = vec!["0xAA".to_string()];
        let p = ledger
            .restore_room_occupants("Block-A", 1, &occupants, 1, true)
            .await
            .unwrap();
        ledger.confirm(p).await.unwrap();

        let p = ledger.delete_student("0xAA").await.unwrap();
        ledger.confirm(p).await.unwrap();

        let info = ledger.room_info("Block-A", 1).await.unwrap();
        assert!(info.occupants.is_empty());
        assert_eq!(info.occupancy, 0);
    }

    #[tokio::test]
    async fn test_call_log_records_submit_and_confirm() {
        let ledger = MemoryLedger::new("0xadmin");
        let p = ledger.add_hostel("Block-A").await.unwrap();
        ledger.confirm(p).await.unwrap();

        let calls = ledger.calls();
        assert_eq!(calls[0], "submit:addHostel(Block-A)");
        assert_eq!(calls[1], "confirm:addHostel(Block-A)");
        assert_eq!(ledger.mutation_submits(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_reverts_without_effect() {
        let ledger = MemoryLedger::new("0xadmin");
        ledger.fail_on("addHostel(Block-A)", "gas estimation failed");

        let err = ledger.add_hostel("Block-A").await.unwrap_err();
        assert_eq!(err.to_string(), "gas estimation failed");
        assert_eq!(ledger.hostel_name_at(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unavailable_ledger_rejects_everything() {
        let ledger = MemoryLedger::new("0xadmin");
        ledger.set_unavailable(true);
        assert!(matches!(
            ledger.is_admin("0xadmin").await,
            Err(LedgerError::Unavailable(_))
        ));
        assert!(matches!(
            ledger.add_hostel("Block-A").await,
            Err(LedgerError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_admin_reverts_for_unknown_wallet() {
        let ledger = MemoryLedger::new("0xadmin");
        let err = ledger.delete_admin("0xBB").await.unwrap_err();
        assert_eq!(err.to_string(), "Not an admin");
    }
}
