//! Terminal surface for podcycle: argument parsing, logging setup and printed output.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;
pub mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use validator::Validate;

pub use cli::{Cli, Commands, PodsArgs, RestartArgs};
pub use progress::TerminalProgressPort;

/// Entry point of the `podcycle` binary.
pub async fn run() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let path = config::config_path(cli.config.as_deref());
    let mut settings = config::load_config(path.as_deref())?;
    cli.apply_overrides(&mut settings);
    settings
        .validate()
        .context("invalid configuration after command-line overrides")?;

    logging::init_logging(&settings.logging);
    debug!(path = ?path, "configuration loaded");

    match cli.resolved_command() {
        Commands::Restart(_) => commands::restart(&settings).await,
        Commands::Pods(args) => commands::pods(&settings, args.since_hours).await,
        Commands::Deployments => commands::deployments(&settings).await,
        Commands::Usage => commands::usage(&settings).await,
    }
}
