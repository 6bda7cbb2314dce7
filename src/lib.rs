//! Shelfmirror: incremental backup of a LiveLib reader profile
//!
//! This crate crawls the paginated listings of a public reader profile
//! (books per reading status, highlighted quotes), extracts records from the
//! listing markup, and merges them into a local backup table without ever
//! re-recording items captured on a previous run.

pub mod backup;
pub mod config;
pub mod crawler;
pub mod merge;
pub mod record;

use thiserror::Error;

/// Main error type for shelfmirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Profile root unreachable: {0}")]
    ProfileUnreachable(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Backup store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported backup file extension for '{0}' (expected .csv or .xlsx)")]
    UnsupportedExtension(String),

    #[error("Unknown transport backend: '{0}'")]
    UnknownTransport(String),

    #[error("Unknown listing kind: '{0}' (expected 'books' or 'quotes')")]
    UnknownListingKind(String),
}

/// Transport-level failure for a single page fetch
///
/// Only transient kinds are retried by the retrying fetcher; a request that
/// could never succeed (malformed URL) propagates immediately.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether another attempt at the same URL could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::InvalidUrl(_))
    }
}

/// Backup table errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read table {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write table {path}: {message}")]
    Write { path: String, message: String },
}

/// Result type alias for shelfmirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use backup::{BackupFormat, BackupStore, TableRecord};
pub use config::{DelayBounds, ListingKind, RunConfig, Transport};
pub use record::{Book, Identity, Quote, ReadingStatus};
