//! Reconciliation engine
//!
//! Orchestrates the convergence of ledger and snapshot mirror:
//!
//! - Save writes hostel documents into the mirror (no ledger traffic).
//! - Restore replays the mirror into the ledger in dependency order:
//!   registrations, then hostel creation, then room creation, then room
//!   state, then per-student allocations. Each mutating call is confirmed
//!   before the next dependent call is submitted.
//! - Targeted deletes mutate the ledger first and patch the mirror only
//!   after confirmation, so the mirror never shows a deletion that did not
//!   durably happen.
//!
//! Failure policy: pre-existence during creation is absorbed as success;
//! any other stage failure aborts the current hostel's remaining stages,
//! is recorded in the run report, and leaves other hostels unaffected.
//! Only a failed authorization check or an unreachable collaborator fails
//! a whole run.

mod engine;
mod errors;
mod planner;
mod report;

pub use engine::SyncEngine;
pub use errors::{SyncError, SyncResult};
pub use planner::{clean_room, collect_occupants, dedup_hostels, DedupResult, PlanError, RoomRestore};
pub use report::{RestoreReport, Stage, StageFailure};
