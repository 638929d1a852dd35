//! Command-line interface for strictly_clock.

use std::path::PathBuf;

use clap::Parser;

use crate::options::DEFAULT_OPTIONS_FILE;

/// Strictly Clock - turn, phase and time tracker for tabletop games
#[derive(Parser, Debug)]
#[command(name = "strictly_clock")]
#[command(about = "Turn, phase and time tracker for tabletop games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Options file to load and save
    #[arg(short, long, default_value = DEFAULT_OPTIONS_FILE)]
    pub options: PathBuf,
}
