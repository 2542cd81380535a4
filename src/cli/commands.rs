//! CLI commands and argument parsing

use crate::output::OutputFormat;
use crate::types::Resource;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inventory fetcher for token-protected, paginated management APIs
#[derive(Parser, Debug)]
#[command(name = "inventory-fetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Secrets file (YAML); rewritten with the rotated tokens
    #[arg(short, long, global = true, default_value = "secrets.yaml")]
    pub secrets: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rotate the token pair and persist it, nothing else
    Refresh,

    /// Fetch one collection
    Fetch {
        /// Collection to fetch
        #[arg(value_enum)]
        resource: Resource,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Requests per second, overriding the config file
        #[arg(long)]
        rate: Option<u32>,

        /// Page size, overriding the config file
        #[arg(long)]
        page_limit: Option<u32>,

        /// Write records as fetched, without flattening
        #[arg(long)]
        raw: bool,
    },

    /// Fetch every collection into a directory
    Run {
        /// Directory receiving bss.<ext> and apinfo.<ext>
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "parquet")]
        format: OutputFormat,

        /// Requests per second, overriding the config file
        #[arg(long)]
        rate: Option<u32>,

        /// Page size, overriding the config file
        #[arg(long)]
        page_limit: Option<u32>,
    },
}
