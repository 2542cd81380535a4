// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # inventory-fetch
//!
//! Rate-limited, token-rotating paginated fetcher for network inventory
//! management APIs.
//!
//! ## Features
//!
//! - **Token rotation**: OAuth2 refresh-token grant, rotated pair persisted
//!   before any data is fetched
//! - **Bounded concurrency**: at most `R` requests in flight, submissions
//!   paced to `R` per second
//! - **Batched pagination**: offset/limit pages fetched in concurrent
//!   batches, terminated by the first empty page
//! - **Flat output**: JSON lines, pretty JSON or Parquet
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use inventory_fetch::{AppConfig, FetchEngine, Resource, Result, YamlSecretStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_file("config.yaml")?;
//!     let store = Arc::new(YamlSecretStore::new("secrets.yaml"));
//!
//!     let mut engine = FetchEngine::new(config, store)?;
//!     for fetch in engine.run(&Resource::all()).await? {
//!         println!("{}: {} records", fetch.resource, fetch.result.records.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FetchEngine                          │
//! │   refresh() → persist → fetch(resource) per collection      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴──────┬────────────────────────┐
//! │     Auth     │     Pagination      │         HTTP           │
//! ├──────────────┼─────────────────────┼────────────────────────┤
//! │ TokenManager │ Paginator           │ HttpClient             │
//! │ SecretStore  │ ScanPolicy          │ RateLimiter (Pacing)   │
//! └──────────────┴─────────────────────┴────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and classification
pub mod error;

/// Common types and type aliases
pub mod types;

/// Token refresh and credential storage
pub mod auth;

/// HTTP client and rate limiting
pub mod http;

/// Batched offset/limit pagination
pub mod pagination;

/// Run configuration
pub mod config;

/// Fetch orchestration
pub mod engine;

/// Record flattening
pub mod normalize;

/// JSON and Parquet output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Phase, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{Credentials, MemorySecretStore, SecretStore, TokenManager, YamlSecretStore};
pub use config::AppConfig;
pub use engine::{FetchEngine, ResourceFetch, RunStats};
pub use http::{HttpClient, Pacing, RateLimiter, RequestExecutor};
pub use pagination::{FetchResult, Paginator, ScanPolicy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
