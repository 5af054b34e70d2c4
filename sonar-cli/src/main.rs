//! Sonar CLI
//!
//! Command-line driver for the Sonar poller queue. Builds synthetic pollers,
//! runs them through a queue and prints the delivered outcomes.

mod commands;
mod config;
mod synthetic;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sonar")]
#[command(about = "Run pollers through an order-preserving queue", long_about = None)]
struct Cli {
    /// Print delivered entries as JSON lines
    #[arg(long, global = true, env = "SONAR_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonar_cli=info,sonar_scheduler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config { json: cli.json };

    handle_command(cli.command, &config).await
}
