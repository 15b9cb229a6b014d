//! The reconciliation engine
//!
//! All mutating sequences run under one write gate: the ledger client is
//! bound to a single signing identity, and overlapping mutations against
//! one signer have undefined sequencing at the ledger layer. Reads are not
//! gated.
//!
//! Every mutating ledger call follows the same discipline: submit, then
//! block on confirmation (bounded by the confirmation timeout) before the
//! next dependent call. A timed-out confirmation has an unknown outcome
//! and is surfaced as such, never replayed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::authz::require_admin;
use crate::ledger::{collect_hostel_names, LedgerClient, LedgerError, PendingCall};
use crate::model::Hostel;
use crate::observability::Logger;
use crate::snapshot::SnapshotStore;

use super::errors::{SyncError, SyncResult};
use super::planner::{self, RoomRestore};
use super::report::{RestoreReport, Stage};

const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Marker for "abort this hostel's remaining stages".
struct StageAbort;

/// Orchestrates save, restore, and targeted deletes across the ledger and
/// the snapshot mirror.
pub struct SyncEngine {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn SnapshotStore>,
    write_gate: Mutex<()>,
    confirmation_timeout: Duration,
}

impl SyncEngine {
    pub fn new(ledger: Arc<dyn LedgerClient>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            ledger,
            store,
            write_gate: Mutex::new(()),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Admin check for the bound signer. Must pass before any mutating
    /// sequence; failure leaves ledger and mirror untouched.
    async fn guard(&self) -> SyncResult<()> {
        let signer = self.ledger.signer().to_string();
        require_admin(self.ledger.as_ref(), &signer).await?;
        Ok(())
    }

    /// Await confirmation, bounded. On timeout the outcome is unknown; the
    /// pending call is dropped, never resubmitted.
    async fn confirm_bounded(&self, pending: PendingCall) -> Result<(), LedgerError> {
        let call = pending.call.clone();
        match tokio::time::timeout(self.confirmation_timeout, self.ledger.confirm(pending)).await
        {
            Ok(result) => result,
            Err(_) => Err(LedgerError::ConfirmationTimeout { call }),
        }
    }

    // ==================
    // Save (input -> mirror)
    // ==================

    /// Upsert hostel documents into the mirror, whole-document replace.
    /// No ledger interaction.
    pub async fn save(&self, hostels: Vec<Hostel>) -> SyncResult<usize> {
        for hostel in &hostels {
            if hostel.name.trim().is_empty() {
                return Err(SyncError::InvalidInput(
                    "hostel name must not be empty".to_string(),
                ));
            }
        }
        let count = hostels.len();
        for hostel in &hostels {
            self.store.upsert_hostel(hostel).await?;
        }
        Logger::info("SNAPSHOT_SAVED", &[("hostels", &count.to_string())]);
        Ok(count)
    }

    // ==================
    // Restore (mirror -> ledger)
    // ==================

    /// Replay the snapshot mirror into the ledger.
    ///
    /// Per-item failures are accumulated into the report; only a failed
    /// admin check or an unreachable collaborator fails the whole run.
    pub async fn restore(&self) -> SyncResult<RestoreReport> {
        let _gate = self.write_gate.lock().await;
        self.guard().await?;

        let mut report = RestoreReport::new();
        let snapshot = self.store.find_all_hostels().await?;
        if snapshot.is_empty() {
            Logger::info("RESTORE_NOOP_EMPTY_SNAPSHOT", &[]);
            return Ok(report);
        }
        Logger::info(
            "RESTORE_RUN_STARTED",
            &[
                ("run_id", &report.run_id.to_string()),
                ("snapshot_hostels", &snapshot.len().to_string()),
            ],
        );

        // Ledger-side hostel list, by sequential index probing. A probe
        // failure ends enumeration but is carried into the report rather
        // than silently read as end-of-list.
        let (mut existing, probe_failure) =
            collect_hostel_names(self.ledger.as_ref()).await;
        if let Some(e) = probe_failure {
            let warning = format!(
                "hostel enumeration ended at index {} on a failed probe: {}",
                existing.len(),
                e
            );
            Logger::warn(
                "HOSTEL_ENUMERATION_ABORTED",
                &[("index", &existing.len().to_string()), ("reason", &e.to_string())],
            );
            report.enumeration_warning = Some(warning);
        }

        let dedup = planner::dedup_hostels(snapshot);
        report.duplicates_dropped = dedup.dropped;

        // Stage: registration. Allocation restoration is rejected for
        // unregistered identities, so the whole occupant set registers
        // first.
        let occupants = planner::collect_occupants(&dedup.hostels);
        for wallet in &occupants {
            self.register_occupant(wallet, &mut report).await;
        }

        // Remaining stages run per hostel; one hostel's failure never
        // blocks another.
        for hostel in &dedup.hostels {
            report.hostels_processed += 1;
            if self
                .restore_hostel(hostel, &mut existing, &mut report)
                .await
                .is_err()
            {
                Logger::warn("HOSTEL_STAGES_ABORTED", &[("hostel", &hostel.name)]);
            }
        }

        Logger::info(
            "RESTORE_RUN_FINISHED",
            &[
                ("run_id", &report.run_id.to_string()),
                ("failures", &report.failures.len().to_string()),
            ],
        );
        Ok(report)
    }

    async fn register_occupant(&self, wallet: &str, report: &mut RestoreReport) {
        match self.ledger.is_registered(wallet).await {
            Ok(true) => {
                Logger::info("STUDENT_ALREADY_REGISTERED", &[("wallet", wallet)]);
            }
            Ok(false) => {
                let submitted = self.ledger.register_student(wallet).await;
                match submitted {
                    Ok(pending) => match self.confirm_bounded(pending).await {
                        Ok(()) => {
                            report.students_registered += 1;
                            Logger::info("STUDENT_REGISTERED", &[("wallet", wallet)]);
                        }
                        Err(e) => {
                            self.record_item_failure(
                                report,
                                Stage::Registration,
                                None,
                                None,
                                Some(wallet),
                                &e,
                            );
                        }
                    },
                    Err(e) if e.is_already_exists() => {
                        Logger::warn(
                            "STUDENT_REGISTRATION_ABSORBED",
                            &[("wallet", wallet), ("reason", &e.to_string())],
                        );
                    }
                    Err(e) => {
                        self.record_item_failure(
                            report,
                            Stage::Registration,
                            None,
                            None,
                            Some(wallet),
                            &e,
                        );
                    }
                }
            }
            Err(e) => {
                self.record_item_failure(
                    report,
                    Stage::Registration,
                    None,
                    None,
                    Some(wallet),
                    &e,
                );
            }
        }
    }

    /// Stages 4-7 for one hostel. Any unabsorbed failure records itself
    /// and aborts this hostel's remaining stages.
    async fn restore_hostel(
        &self,
        hostel: &Hostel,
        existing: &mut Vec<String>,
        report: &mut RestoreReport,
    ) -> Result<(), StageAbort> {
        // Stage: hostel creation, pre-existence absorbed.
        if existing.iter().any(|name| *name == hostel.name) {
            Logger::info("HOSTEL_EXISTS_SKIPPED", &[("hostel", &hostel.name)]);
        } else {
            let created = match self.ledger.add_hostel(&hostel.name).await {
                Ok(pending) => self.confirm_bounded(pending).await,
                Err(e) => Err(e),
            };
            match created {
                Ok(()) => {
                    report.hostels_created += 1;
                    existing.push(hostel.name.clone());
                    Logger::info("HOSTEL_CREATED", &[("hostel", &hostel.name)]);
                }
                Err(e) if e.is_already_exists() => {
                    existing.push(hostel.name.clone());
                    Logger::warn(
                        "HOSTEL_CREATE_ABSORBED",
                        &[("hostel", &hostel.name), ("reason", &e.to_string())],
                    );
                }
                Err(e) => {
                    self.record_item_failure(
                        report,
                        Stage::HostelCreation,
                        Some(&hostel.name),
                        None,
                        None,
                        &e,
                    );
                    return Err(StageAbort);
                }
            }
        }

        // Room-id membership is ground truth on the ledger; fetch it fresh
        // for this hostel.
        let mut room_ids = match self.ledger.room_ids_of(&hostel.name).await {
            Ok(ids) => ids,
            Err(e) => {
                self.record_item_failure(
                    report,
                    Stage::RoomCreation,
                    Some(&hostel.name),
                    None,
                    None,
                    &e,
                );
                return Err(StageAbort);
            }
        };

        for room in &hostel.rooms {
            let plan = match planner::clean_room(room) {
                Ok(plan) => plan,
                Err(e) => {
                    self.record_item_failure(
                        report,
                        Stage::RoomCreation,
                        Some(&hostel.name),
                        Some(&room.id),
                        None,
                        &e,
                    );
                    return Err(StageAbort);
                }
            };
            self.restore_room(&hostel.name, &plan, &mut room_ids, report)
                .await?;
        }
        Ok(())
    }

    /// Stages 5-7 for one room: create if missing, replace state, then
    /// restore each occupant's allocation only after the room state has
    /// been confirmed.
    async fn restore_room(
        &self,
        hostel: &str,
        plan: &RoomRestore,
        room_ids: &mut Vec<u64>,
        report: &mut RestoreReport,
    ) -> Result<(), StageAbort> {
        let room_label = plan.room_id.to_string();

        // Stage: room creation, pre-existence absorbed.
        if room_ids.contains(&plan.room_id) {
            Logger::info(
                "ROOM_EXISTS_SKIPPED",
                &[("hostel", hostel), ("room", &room_label)],
            );
        } else {
            let created = match self.ledger.add_room(hostel, plan.room_id).await {
                Ok(pending) => self.confirm_bounded(pending).await,
                Err(e) => Err(e),
            };
            match created {
                Ok(()) => {
                    report.rooms_created += 1;
                    Logger::info("ROOM_CREATED", &[("hostel", hostel), ("room", &room_label)]);
                }
                Err(e) if e.is_already_exists() => {
                    Logger::warn(
                        "ROOM_CREATE_ABSORBED",
                        &[
                            ("hostel", hostel),
                            ("room", &room_label),
                            ("reason", &e.to_string()),
                        ],
                    );
                }
                Err(e) => {
                    self.record_item_failure(
                        report,
                        Stage::RoomCreation,
                        Some(hostel),
                        Some(&room_label),
                        None,
                        &e,
                    );
                    return Err(StageAbort);
                }
            }
            // Creations change the ledger's room-id enumeration; re-fetch
            // rather than patching the local copy.
            *room_ids = match self.ledger.room_ids_of(hostel).await {
                Ok(ids) => ids,
                Err(e) => {
                    self.record_item_failure(
                        report,
                        Stage::RoomCreation,
                        Some(hostel),
                        Some(&room_label),
                        None,
                        &e,
                    );
                    return Err(StageAbort);
                }
            };
        }

        // Stage: room state, full replace. The replay is skipped when the
        // ledger already reports exactly this payload, so a converged run
        // submits nothing; any divergence replaces the whole state.
        let current = match self.ledger.room_info(hostel, plan.room_id).await {
            Ok(info) => info,
            Err(e) => {
                self.record_item_failure(
                    report,
                    Stage::RoomState,
                    Some(hostel),
                    Some(&room_label),
                    None,
                    &e,
                );
                return Err(StageAbort);
            }
        };
        let state_current = current.occupants == plan.occupants
            && current.occupancy == plan.occupancy
            && current.available == plan.available;
        if state_current {
            Logger::info(
                "ROOM_STATE_CURRENT",
                &[("hostel", hostel), ("room", &room_label)],
            );
        } else {
            let restored = match self
                .ledger
                .restore_room_occupants(
                    hostel,
                    plan.room_id,
                    &plan.occupants,
                    plan.occupancy,
                    plan.available,
                )
                .await
            {
                Ok(pending) => self.confirm_bounded(pending).await,
                Err(e) => Err(e),
            };
            if let Err(e) = restored {
                self.record_item_failure(
                    report,
                    Stage::RoomState,
                    Some(hostel),
                    Some(&room_label),
                    None,
                    &e,
                );
                return Err(StageAbort);
            }
            report.room_states_restored += 1;
            Logger::info(
                "ROOM_STATE_RESTORED",
                &[
                    ("hostel", hostel),
                    ("occupancy", &plan.occupancy.to_string()),
                    ("room", &room_label),
                ],
            );
        }

        // Stage: allocations. Runs only after the room state above is
        // known confirmed or already current. Occupants fail individually.
        for wallet in &plan.occupants {
            self.restore_allocation(hostel, plan.room_id, &room_label, wallet, report)
                .await;
        }
        Ok(())
    }

    /// Bind one occupant to (hostel, room), skipping when the ledger
    /// already holds that allocation.
    async fn restore_allocation(
        &self,
        hostel: &str,
        room_id: u64,
        room_label: &str,
        wallet: &str,
        report: &mut RestoreReport,
    ) {
        match self.ledger.student_info(wallet).await {
            Ok(info)
                if info.hostel.as_deref() == Some(hostel) && info.room == Some(room_id) =>
            {
                Logger::info(
                    "ALLOCATION_CURRENT",
                    &[("hostel", hostel), ("room", room_label), ("wallet", wallet)],
                );
                return;
            }
            Ok(_) => {}
            Err(e) => {
                self.record_item_failure(
                    report,
                    Stage::Allocation,
                    Some(hostel),
                    Some(room_label),
                    Some(wallet),
                    &e,
                );
                return;
            }
        }

        let allocated = match self
            .ledger
            .restore_student_allocation(wallet, hostel, room_id)
            .await
        {
            Ok(pending) => self.confirm_bounded(pending).await,
            Err(e) => Err(e),
        };
        match allocated {
            Ok(()) => {
                report.allocations_restored += 1;
                Logger::info(
                    "ALLOCATION_RESTORED",
                    &[("hostel", hostel), ("room", room_label), ("wallet", wallet)],
                );
            }
            Err(e) => {
                self.record_item_failure(
                    report,
                    Stage::Allocation,
                    Some(hostel),
                    Some(room_label),
                    Some(wallet),
                    &e,
                );
            }
        }
    }

    fn record_item_failure(
        &self,
        report: &mut RestoreReport,
        stage: Stage,
        hostel: Option<&str>,
        room: Option<&str>,
        occupant: Option<&str>,
        reason: &dyn std::fmt::Display,
    ) {
        let reason = reason.to_string();
        Logger::error(
            "STAGE_ITEM_FAILED",
            &[
                ("hostel", hostel.unwrap_or("-")),
                ("occupant", occupant.unwrap_or("-")),
                ("reason", &reason),
                ("room", room.unwrap_or("-")),
                ("stage", stage.as_str()),
            ],
        );
        report.record_failure(stage, hostel, room, occupant, reason);
    }

    // ==================
    // Targeted deletes (ledger first, mirror after confirmation)
    // ==================

    pub async fn delete_hostel(&self, name: &str) -> SyncResult<()> {
        let _gate = self.write_gate.lock().await;
        self.guard().await?;

        let pending = self
            .ledger
            .delete_hostel(name)
            .await
            .map_err(SyncError::Ledger)?;
        self.confirm_bounded(pending)
            .await
            .map_err(SyncError::Ledger)?;

        self.store.delete_hostel(name).await?;
        Logger::info("HOSTEL_DELETED", &[("hostel", name)]);
        Ok(())
    }

    pub async fn delete_room(&self, hostel: &str, room_id: u64) -> SyncResult<()> {
        let _gate = self.write_gate.lock().await;
        self.guard().await?;

        let pending = self
            .ledger
            .delete_room(hostel, room_id)
            .await
            .map_err(SyncError::Ledger)?;
        self.confirm_bounded(pending)
            .await
            .map_err(SyncError::Ledger)?;

        self.store.pull_room_from_hostel(hostel, room_id).await?;
        Logger::info(
            "ROOM_DELETED",
            &[("hostel", hostel), ("room", &room_id.to_string())],
        );
        Ok(())
    }

    pub async fn delete_student(&self, wallet: &str) -> SyncResult<()> {
        let _gate = self.write_gate.lock().await;
        self.guard().await?;

        let pending = self
            .ledger
            .delete_student(wallet)
            .await
            .map_err(SyncError::Ledger)?;
        self.confirm_bounded(pending)
            .await
            .map_err(SyncError::Ledger)?;

        self.store.pull_occupant_from_all_rooms(wallet).await?;
        Logger::info("STUDENT_DELETED", &[("wallet", wallet)]);
        Ok(())
    }

    /// Admin membership is never cached off-ledger, so there is no mirror
    /// write here.
    pub async fn delete_admin(&self, wallet: &str) -> SyncResult<()> {
        let _gate = self.write_gate.lock().await;
        self.guard().await?;

        let pending = self
            .ledger
            .delete_admin(wallet)
            .await
            .map_err(SyncError::Ledger)?;
        self.confirm_bounded(pending)
            .await
            .map_err(SyncError::Ledger)?;

        Logger::info("ADMIN_DELETED", &[("wallet", wallet)]);
        Ok(())
    }

    // ==================
    // Administrative reset (mirror only)
    // ==================

    /// Clear the mirror. The ledger has no counterpart for this; it is a
    /// local cache reset.
    pub async fn reset_store(&self) -> SyncResult<()> {
        self.store.delete_all_hostels().await?;
        Logger::info("SNAPSHOT_STORE_CLEARED", &[]);
        Ok(())
    }
}
