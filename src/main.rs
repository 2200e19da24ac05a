mod cli;
mod commands;
mod dispatcher;

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use ethbasis::config::Config;

fn main() -> Result<()> {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    debug!("Using config: {:?}", config);

    let command = cli::runner::to_internal_command(&cli.command, &config)?;
    let output = dispatcher::OutputOptions::from_config(&config, cli.json);
    dispatcher::dispatch_command(command, &output)
}
