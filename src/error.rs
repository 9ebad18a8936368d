//! Error types.
//!
//! [`ConfigError`] and [`SourceError`] are domain errors: the user can fix
//! them (bad config, missing token, unreachable service). Everything else
//! surfaced through [`Error`] indicates a bug or an I/O failure on the output.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported config file format: {path} (use .toml, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Unknown severity: {0}. Use: low, moderate, high, critical")]
    InvalidSeverity(String),

    #[error("No severities configured; at least one is required")]
    NoSeverities,
}

/// Failure to fetch vulnerabilities from an advisory source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Missing credential for {database}: set the {variable} environment variable")]
    MissingToken {
        database: String,
        variable: &'static str,
    },

    #[error("Request to {database} failed: {source}")]
    Network {
        database: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{database} returned HTTP {status}: {message}")]
    Http {
        database: String,
        status: u16,
        message: String,
    },

    #[error("{database} rejected the query: {message}")]
    Query { database: String, message: String },

    #[error("Malformed response from {database}: {message}")]
    Malformed { database: String, message: String },
}

/// Top-level error for a constraints run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Failed to write constraints: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for errors the user can act on, as opposed to bugs.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Source(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
