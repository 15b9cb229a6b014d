//! hostelsync - reconciliation backend for a ledger-backed room-allocation system
//!
//! The authoritative state (hostels, rooms, students, admins) lives in a
//! transaction-gated ledger. This crate keeps a local snapshot mirror
//! consistent with it: Save populates the mirror, Restore replays the mirror
//! into the ledger in dependency order, and targeted deletes mutate the
//! ledger first and patch the mirror only after confirmation.

pub mod authz;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod ledger;
pub mod model;
pub mod observability;
pub mod reconcile;
pub mod snapshot;
