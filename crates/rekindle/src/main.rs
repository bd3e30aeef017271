// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rekindle - scheduled SMS follow-ups for real-estate agents.
//!
//! Binary entry point: loads configuration, then runs the requested
//! subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rekindle_config::RekindleConfig;

mod serve;
mod setup;

/// Rekindle - scheduled SMS follow-ups for real-estate agents.
#[derive(Parser, Debug)]
#[command(name = "rekindle", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (overrides the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the engine: dispatch sweeps, engagement scoring, inbound webhooks.
    Serve,
    /// Create or migrate the database and seed the stock templates.
    InitDb,
}

fn load_config(cli: &Cli) -> Result<RekindleConfig, rekindle_core::RekindleError> {
    match cli.config.as_deref() {
        Some(path) => rekindle_config::load_config_from_path(path)
            .map_err(|e| rekindle_core::RekindleError::Config(e.to_string())),
        None => rekindle_config::load(),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rekindle={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(&config.engine.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::InitDb => setup::run_init_db(config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "fatal");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
