//! inventory-fetch CLI
//!
//! Command-line interface for fetching inventory

use clap::Parser;
use inventory_fetch::cli::{Cli, Runner};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        error!(kind = %e.kind(), "{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
