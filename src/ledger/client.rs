//! The ledger client trait
//!
//! One implementation speaks to the real chain; [`super::MemoryLedger`]
//! implements the same observable contract in memory for tests and for
//! running the service without a chain endpoint. All mutating calls are
//! issued under a single signing identity, so callers are expected to
//! confirm each pending call before submitting the next dependent one.

use async_trait::async_trait;

use super::errors::LedgerResult;
use super::types::{RoomInfo, StudentInfo};

/// Handle for a submitted-but-unconfirmed mutating call.
///
/// The effect of the call is not durable until [`LedgerClient::confirm`]
/// returns Ok for this handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCall {
    /// Human-readable call descriptor, e.g. `addHostel(Block-A)`.
    pub call: String,
    /// Transaction hash assigned at submission.
    pub tx: String,
}

impl PendingCall {
    pub fn new(call: impl Into<String>, tx: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            tx: tx.into(),
        }
    }
}

/// Client bound to one authorized signing identity.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The wallet address every mutating call is signed with.
    fn signer(&self) -> &str;

    // Read-only queries. Side-effect free; may be issued concurrently.

    async fn is_admin(&self, identity: &str) -> LedgerResult<bool>;

    /// Hostel name at the given enumeration index, None past the end.
    async fn hostel_name_at(&self, index: u64) -> LedgerResult<Option<String>>;

    /// Room ids currently registered for a hostel. This enumeration is the
    /// ground truth for room membership; callers must re-fetch it after any
    /// confirmed room creation rather than patching a cached copy.
    async fn room_ids_of(&self, hostel: &str) -> LedgerResult<Vec<u64>>;

    async fn room_info(&self, hostel: &str, room_id: u64) -> LedgerResult<RoomInfo>;

    async fn student_info(&self, wallet: &str) -> LedgerResult<StudentInfo>;

    async fn is_registered(&self, wallet: &str) -> LedgerResult<bool>;

    // Mutating calls. Each returns a pending handle to be confirmed.

    async fn register_student(&self, wallet: &str) -> LedgerResult<PendingCall>;

    async fn add_hostel(&self, name: &str) -> LedgerResult<PendingCall>;

    async fn add_room(&self, hostel: &str, room_id: u64) -> LedgerResult<PendingCall>;

    /// Replace a room's occupant set, occupancy count, and availability
    /// wholesale. Replaying the same payload leaves ledger state unchanged.
    async fn restore_room_occupants(
        &self,
        hostel: &str,
        room_id: u64,
        occupants: &[String],
        occupancy: u64,
        available: bool,
    ) -> LedgerResult<PendingCall>;

    async fn restore_student_allocation(
        &self,
        wallet: &str,
        hostel: &str,
        room_id: u64,
    ) -> LedgerResult<PendingCall>;

    async fn delete_hostel(&self, name: &str) -> LedgerResult<PendingCall>;

    async fn delete_room(&self, hostel: &str, room_id: u64) -> LedgerResult<PendingCall>;

    async fn delete_student(&self, wallet: &str) -> LedgerResult<PendingCall>;

    async fn delete_admin(&self, wallet: &str) -> LedgerResult<PendingCall>;

    /// Block until the pending call's effect is durable.
    async fn confirm(&self, pending: PendingCall) -> LedgerResult<()>;
}
