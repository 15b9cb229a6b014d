//! Snapshot store error types

use thiserror::Error;

/// Result type for snapshot store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by snapshot store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached or its state is unusable.
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),

    /// I/O failure while persisting or loading the document set.
    #[error("snapshot store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document set cannot be decoded.
    #[error("snapshot store holds undecodable data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
