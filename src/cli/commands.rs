//! CLI command implementations
//!
//! Commands build the tokio runtime themselves; main.rs stays synchronous
//! and only dispatches here.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::http_server::{HttpServer, SyncState};
use crate::ledger::MemoryLedger;
use crate::observability::Logger;
use crate::reconcile::SyncEngine;
use crate::snapshot::{FileStore, SnapshotStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and dispatch.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch an already-parsed command.
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve { config } => serve(&config),
        Command::Reset { config } => reset(&config),
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| CliError::startup(e.to_string()))
}

/// Load config, open the snapshot store, and serve the HTTP API.
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let runtime = runtime()?;

    runtime.block_on(async {
        let store = FileStore::open(&config.snapshot_path)?;
        Logger::info(
            "SNAPSHOT_STORE_OPENED",
            &[("path", &config.snapshot_path)],
        );

        // Without a chain endpoint the service runs against the in-memory
        // ledger; bind a chain-backed LedgerClient here to go live.
        let ledger = MemoryLedger::new(config.signer.clone());
        Logger::warn("LEDGER_BACKEND_IN_MEMORY", &[("signer", &config.signer)]);

        let engine = SyncEngine::new(Arc::new(ledger), Arc::new(store))
            .with_confirmation_timeout(Duration::from_secs(config.confirmation_timeout_secs));
        let state = Arc::new(SyncState::new(engine));

        let server = HttpServer::new(config.http.clone(), state);
        server
            .start()
            .await
            .map_err(|e| CliError::startup(e.to_string()))
    })
}

/// Clear the snapshot store without starting the server.
pub fn reset(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let runtime = runtime()?;

    runtime.block_on(async {
        let store = FileStore::open(&config.snapshot_path)?;
        store.delete_all_hostels().await?;
        Ok::<(), CliError>(())
    })?;

    println!("Snapshot store cleared: {}", config.snapshot_path);
    Ok(())
}
