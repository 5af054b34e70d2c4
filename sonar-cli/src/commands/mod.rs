//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod probe;
mod run;

pub use probe::ProbeArgs;
pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run synthetic pollers through a queue and print deliveries in order
    Run(RunArgs),
    /// Drive a single synthetic poller and print its outcome
    Probe(ProbeArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run(args) => run::handle_run(args, config).await,
        Commands::Probe(args) => probe::handle_probe(args, config).await,
    }
}

/// Applies optional millisecond overrides on top of a base value
pub(crate) fn millis_or(value: Option<u64>, base: std::time::Duration) -> std::time::Duration {
    value.map(std::time::Duration::from_millis).unwrap_or(base)
}
