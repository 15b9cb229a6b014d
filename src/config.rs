//! Service configuration
//!
//! Loaded from a JSON file (`hostelsync.json` by default). Every field but
//! the signer has a default, so a minimal config is just the signing
//! identity the service submits ledger calls with.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Unreadable(String),

    #[error("invalid config JSON: {0}")]
    Invalid(String),

    #[error("config validation failed: {0}")]
    Validation(String),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wallet address every mutating ledger call is signed with.
    pub signer: String,

    /// Path of the snapshot mirror file.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Upper bound on waiting for one ledger confirmation.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    /// HTTP bind and CORS settings.
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_snapshot_path() -> String {
    "./hostelsync-snapshot.json".to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Unreadable(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.signer.trim().is_empty() {
            return Err(ConfigError::Validation(
                "signer must not be empty".to_string(),
            ));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confirmation_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
