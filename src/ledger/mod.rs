//! Ledger client abstraction
//!
//! The ledger is the authoritative store for hostels, rooms, students, and
//! admin membership. It is reached through a stateful client bound to one
//! signing identity; every mutating call is two-phase: submission returns a
//! pending handle, and the effect only counts as durable once the handle has
//! been confirmed.
//!
//! The ledger has no "list all hostels" call. Enumeration probes names by
//! sequential index through [`HostelNames`], which reports each step as a
//! tagged probe so callers can tell a clean end of list from a probe that
//! failed.

mod client;
mod enumerate;
mod errors;
mod memory;
mod types;

pub use client::{LedgerClient, PendingCall};
pub use enumerate::{collect_hostel_names, HostelNames, Probe};
pub use errors::{LedgerError, LedgerResult};
pub use memory::MemoryLedger;
pub use types::{RoomInfo, StudentInfo};
