//! Error types for inventory-fetch
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Every variant maps onto a coarse [`ErrorKind`] so callers can report
//! failures by category without matching on individual variants.

use std::fmt;
use thiserror::Error;

/// The main error type for inventory-fetch
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // Response Shape Errors
    // ============================================================================
    #[error("Unexpected response shape: {message}")]
    Schema { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Persistence / Output Errors
    // ============================================================================
    #[error("Secret store error: {message}")]
    SecretStore { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Phase wrapper
    // ============================================================================
    #[error("{phase} failed ({kind}): {source}", kind = .source.kind())]
    Phase {
        phase: Phase,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Token invalid/expired or refresh rejected
    Auth,
    /// Non-success status or transport failure
    Http,
    /// No response within the request deadline
    Timeout,
    /// Response did not have the expected shape
    Schema,
    /// Bad or missing configuration
    Config,
    /// Local persistence or output failure
    Io,
    /// Anything else
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Auth => "auth error",
            ErrorKind::Http => "http error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Schema => "schema error",
            ErrorKind::Config => "config error",
            ErrorKind::Io => "io error",
            ErrorKind::Other => "error",
        };
        f.write_str(name)
    }
}

/// Phase of a run, used to label fatal errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Loading config or secrets
    Setup,
    /// Refresh-token exchange
    Refresh,
    /// Writing rotated credentials back to the secret store
    Persist,
    /// Paginated fetch of one collection
    Fetch(String),
    /// Writing results
    Output,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Refresh => f.write_str("token refresh"),
            Phase::Persist => f.write_str("credential persistence"),
            Phase::Fetch(resource) => write!(f, "fetch of '{resource}'"),
            Phase::Output => f.write_str("output"),
        }
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a secret store error
    pub fn secret_store(message: impl Into<String>) -> Self {
        Self::SecretStore {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Label this error with the phase it happened in
    #[must_use]
    pub fn in_phase(self, phase: Phase) -> Self {
        Self::Phase {
            phase,
            source: Box::new(self),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth { .. } => ErrorKind::Auth,
            Error::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Error::Http(_) | Error::HttpStatus { .. } => ErrorKind::Http,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Schema { .. } | Error::Decode { .. } => ErrorKind::Schema,
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Config,
            Error::SecretStore { .. }
            | Error::Output { .. }
            | Error::Arrow(_)
            | Error::Parquet(_)
            | Error::Io(_) => ErrorKind::Io,
            Error::Phase { source, .. } => source.kind(),
            Error::JsonParse(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// The phase this error was labelled with, if any
    pub fn phase(&self) -> Option<&Phase> {
        match self {
            Error::Phase { phase, .. } => Some(phase),
            _ => None,
        }
    }
}

/// Result type alias for inventory-fetch
pub type Result<T> = std::result::Result<T, Error>;
