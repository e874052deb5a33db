// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use tart_cli::args::{Cli, Commands};
use tart_cli::commands;
use tart_client::Tart;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::with_cli_overrides(
        commands::load(cli.config.as_deref())?,
        cli.registry.clone(),
    );

    let filter = if cli.debug {
        EnvFilter::new("tart=debug")
    } else {
        let level = config.log_level.as_deref().unwrap_or("info");
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("tart={level}")))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Config(cmd) = &cli.command {
        return commands::config_command(cmd, &config);
    }

    let tart = Tart::new(&config).context("initialize tart client")?;
    commands::dispatch(&tart, cli.command, cli.json).await
}
