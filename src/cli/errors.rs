//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::snapshot::StoreError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("snapshot store error: {0}")]
    Store(#[from] StoreError),

    #[error("startup failed: {0}")]
    Startup(String),
}

impl CliError {
    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup(message.into())
    }
}
