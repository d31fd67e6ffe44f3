// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use f8ctl::cli::{self, Cli};
use f8ctl::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing, logs go to stderr so stdout stays scriptable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    if let Err(e) = cli::run(cli, config).await {
        error!("{}", e);
        if e.is_unsafe() {
            eprintln!(
                "!!! The cluster was left in a degraded state and needs manual intervention !!!"
            );
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
