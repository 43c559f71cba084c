//! mima CLI
//!
//! Inspects what a resolution context would look like for the current
//! user: effective settings, the assembled session, and routing decisions.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = cli.context.to_overrides();
    match cli.command {
        Commands::Settings { json } => commands::run_settings(&overrides, json),
        Commands::Context { json } => commands::run_context(&overrides, json),
        Commands::Route { url, id } => commands::run_route(&overrides, &id, &url),
        Commands::Completions { shell } => {
            commands::run_completions(shell);
            Ok(())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG`; `--verbose` raises the default to debug
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}
