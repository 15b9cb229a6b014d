//! Observability for hostelsync
//!
//! Structured logging only: one JSON object per line, event name first,
//! deterministic field ordering, synchronous writes. Reconciliation is a
//! replay-oriented system, so every stage transition and every absorbed or
//! isolated failure gets its own event with enough fields to locate the
//! entity involved.

mod logger;

pub use logger::{Logger, Severity};
