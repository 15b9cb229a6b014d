//! Authorization guard
//!
//! Every mutating sequence starts here. Admin membership is a ledger
//! predicate, never cached locally, so the check is a live read against
//! the ledger's admin registry. A failed check aborts before any ledger or
//! mirror mutation is attempted.

use thiserror::Error;

use crate::ledger::{LedgerClient, LedgerError};
use crate::observability::Logger;

/// Guard failure.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The identity is not in the ledger's admin registry.
    #[error("identity {identity} is not a recognized administrator")]
    NotAuthorized { identity: String },

    /// The admin predicate itself could not be read.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Require that `identity` is a recognized administrator on the ledger.
pub async fn require_admin(ledger: &dyn LedgerClient, identity: &str) -> Result<(), AuthzError> {
    if ledger.is_admin(identity).await? {
        Ok(())
    } else {
        Logger::warn("ADMIN_CHECK_REJECTED", &[("identity", identity)]);
        Err(AuthzError::NotAuthorized {
            identity: identity.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    #[tokio::test]
    async fn test_admin_identity_passes() {
        let ledger = MemoryLedger::new("0xadmin");
        assert!(require_admin(&ledger, "0xadmin").await.is_ok());
    }

    #[tokio::test]
    async fn test_non_admin_identity_rejected() {
        let ledger = MemoryLedger::new("0xadmin");
        let err = require_admin(&ledger, "0xother").await.unwrap_err();
        assert!(matches!(err, AuthzError::NotAuthorized { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_predicate_propagates_ledger_error() {
        let ledger = MemoryLedger::new("0xadmin");
        ledger.set_unavailable(true);
        let err = require_admin(&ledger, "0xadmin").await.unwrap_err();
        assert!(matches!(err, AuthzError::Ledger(_)));
    }
}
