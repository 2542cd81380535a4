//! CLI module
//!
//! Command-line interface for fetching inventory.
//!
//! # Commands
//!
//! - `refresh` - Rotate and persist the token pair
//! - `fetch` - Fetch one collection to a file or stdout
//! - `run` - Fetch every collection into a directory

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
