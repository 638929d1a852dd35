//! Strictly Clock - terminal turn tracker
//!
//! Tracks turns, phases and time per player for tabletop games.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use strictly_clock::{Cli, run_tui};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Diagnostic log file, kept off the terminal the UI draws on.
const TRACE_FILE: &str = "strictly_clock.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing()?;

    info!(options = %cli.options.display(), "Starting Strictly Clock");
    run_tui(&cli.options).await
}

fn init_tracing() -> Result<()> {
    let log_file = std::fs::File::create(TRACE_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
