//! CLI argument definitions using clap
//!
//! Commands:
//! - hostelsync serve --config <path>
//! - hostelsync reset --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hostelsync - ledger/snapshot reconciliation service
#[derive(Parser, Debug)]
#[command(name = "hostelsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the reconciliation HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./hostelsync.json")]
        config: PathBuf,
    },

    /// Clear the snapshot store and exit
    Reset {
        /// Path to configuration file
        #[arg(long, default_value = "./hostelsync.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_parses_with_default_config() {
        let cli = Cli::try_parse_from(["hostelsync", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config } => {
                assert_eq!(config, PathBuf::from("./hostelsync.json"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_reset_accepts_explicit_config() {
        let cli = Cli::try_parse_from(["hostelsync", "reset", "--config", "/tmp/h.json"]).unwrap();
        match cli.command {
            Command::Reset { config } => {
                assert_eq!(config, PathBuf::from("/tmp/h.json"));
            }
            _ => panic!("expected reset"),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["hostelsync", "migrate"]).is_err());
    }
}
