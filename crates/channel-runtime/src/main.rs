//! # Channel Runtime
//!
//! Command-line entry point for a merchant sales channel.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags (each overrides its `SC_*` environment variable)
//! 2. Initialize logging and metrics
//! 3. Open the local store and wire the HTTP ledger client
//! 4. Run the subcommand

mod cli;
mod commands;
mod wiring;

use anyhow::{Context, Result};
use channel_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &cli.global.log_level {
        telemetry = telemetry.with_log_level(level);
    }
    telemetry.json_logs |= cli.global.json_logs;
    let _guard = init_telemetry(telemetry).context("failed to initialize telemetry")?;

    let command = match cli.command {
        // Metrics are local to this process; no store or ledger needed
        Command::Metrics => {
            print!("{}", encode_metrics()?);
            return Ok(());
        }
        Command::Channel(command) => command,
    };

    let service = wiring::build_service(cli.global.channel_config()).await?;
    commands::run(command, &service).await
}
