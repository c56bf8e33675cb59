//! Error types for tpl-transfer

use std::path::PathBuf;

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a transfer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checksum mismatch after copy: {path}")]
    ChecksumMismatch { path: PathBuf },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("transfer cancelled")]
    Cancelled,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Only transport-level failures qualify; HTTP status errors and local
    /// conditions are permanent.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
