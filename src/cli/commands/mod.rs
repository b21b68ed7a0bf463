//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod search;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "busplus")]
#[command(about = "Bus trip availability scraper for BusPlus checkout pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./busplus.toml when present)
    #[arg(short, long, global = true, env = "BUSPLUS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP search API
    Serve {
        /// Bind address (port, host, or host:port); overrides config and PORT
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run a single search and print the trips
    Search {
        /// Origin city as the checkout expects it
        from: String,
        /// Destination city
        to: String,
        /// Travel date (YYYY-MM-DD)
        date: String,
        /// Number of passengers
        #[arg(short, long, default_value = "1")]
        passengers: u32,
        /// Print the raw JSON envelope instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(settings, bind.as_deref()).await,
        Commands::Search {
            from,
            to,
            date,
            passengers,
            json,
        } => search::cmd_search(&settings, &from, &to, &date, passengers, json).await,
    }
}
