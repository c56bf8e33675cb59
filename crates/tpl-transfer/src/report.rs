//! Batch transfer outcome reporting

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::Error;

/// Why one item inside a batch failed.
///
/// Carries a rendered message instead of the underlying error so reports
/// stay cheap to clone and hand to UI code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    SourceNotFound,
    DestinationExists,
    Io(String),
    ChecksumMismatch,
}

impl FailureKind {
    pub(crate) fn from_error(err: &Error) -> Self {
        match err {
            Error::SourceNotFound { .. } => Self::SourceNotFound,
            Error::DestinationExists { .. } => Self::DestinationExists,
            Error::ChecksumMismatch { .. } => Self::ChecksumMismatch,
            other => Self::Io(other.to_string()),
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound => write!(f, "source not found"),
            Self::DestinationExists => write!(f, "destination already exists"),
            Self::Io(message) => write!(f, "{message}"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
        }
    }
}

/// Outcome of a directory copy.
///
/// Paths are relative to the source root, so two runs over the same tree
/// produce comparable sets. Items skipped because of cancellation appear in
/// neither collection.
#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    /// Items fully written under their final destination name.
    pub succeeded: BTreeSet<PathBuf>,
    /// Items that failed, with the reason per item.
    pub failed: BTreeMap<PathBuf, FailureKind>,
    /// Bytes written across all succeeded items.
    pub bytes_transferred: u64,
    /// Whether the batch was cut short by cancellation.
    pub cancelled: bool,
}

impl TransferReport {
    /// True when every discovered item was copied.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}
