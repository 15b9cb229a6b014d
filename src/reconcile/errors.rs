//! Reconciliation error taxonomy
//!
//! Only operation-fatal conditions live here. Per-item stage failures are
//! not errors at this level; they are accumulated into the run report and
//! the operation still succeeds with an itemized outcome.

use thiserror::Error;

use crate::authz::AuthzError;
use crate::ledger::LedgerError;
use crate::snapshot::StoreError;

/// Result type for reconciliation operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Operation-fatal reconciliation failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The signing identity failed the admin check. No mutation was
    /// attempted anywhere.
    #[error("signer {identity} is not a recognized administrator")]
    NotAuthorized { identity: String },

    /// The ledger cannot be reached at all.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The snapshot store cannot be reached or persisted.
    #[error("snapshot store unavailable: {0}")]
    StoreUnavailable(String),

    /// Malformed request input, rejected before any side effect.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A targeted ledger call failed; carries the ledger's own revert
    /// reason so the surfaced message stays domain-specific.
    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<AuthzError> for SyncError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthorized { identity } => Self::NotAuthorized { identity },
            AuthzError::Ledger(e) => Self::LedgerUnavailable(e.to_string()),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
