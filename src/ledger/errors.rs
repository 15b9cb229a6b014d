//! Ledger-specific error types

use thiserror::Error;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors surfaced by the ledger client.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The ledger endpoint cannot be reached at all.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger rejected the call with a domain revert reason.
    ///
    /// The reason is the message users should see, so Display carries it
    /// verbatim rather than wrapping it in generic text.
    #[error("{reason}")]
    Reverted { reason: String },

    /// Confirmation did not arrive in time. The call's outcome is unknown:
    /// it may still land. Callers must never replay it automatically.
    #[error("confirmation timed out for {call}; outcome unknown")]
    ConfirmationTimeout { call: String },
}

impl LedgerError {
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::Reverted {
            reason: reason.into(),
        }
    }

    /// True when the error is a creation revert caused solely by the target
    /// already existing. Creation stages absorb these as successful no-ops.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Reverted { reason } => {
                let reason = reason.to_ascii_lowercase();
                reason.contains("already exists") || reason.contains("already registered")
            }
            _ => false,
        }
    }
}
