//! Binary crate for the `delay` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Collecting trip details and credentials interactively
//! - Human-friendly output of forecasts and predictions

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
