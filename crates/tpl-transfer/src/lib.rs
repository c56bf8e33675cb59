//! Concurrent file transfer engine
//!
//! Copies files and directory trees and downloads remote resources, with
//! bounded concurrency, per-item failure isolation, cancellation, and
//! progress reporting.
//!
//! Guarantees, in short:
//!
//! - a destination name never holds a partial file — writes stage into a
//!   sibling `.part` file and rename on success;
//! - one unreadable file does not abort the rest of a directory copy, it is
//!   recorded in the [`TransferReport`] instead;
//! - cancellation stops admitting queued items immediately and aborts
//!   in-flight items at their next I/O checkpoint; completed items stay
//!   completed.

pub mod copy;
pub mod download;
pub mod error;
pub mod progress;
pub mod report;

mod engine;

pub use copy::{CopyOptions, DEFAULT_MAX_CONCURRENCY};
pub use download::{DownloadOptions, RetryPolicy};
pub use engine::TransferEngine;
pub use error::{Error, Result};
pub use progress::{ProgressEvent, ProgressSink};
pub use report::{FailureKind, TransferReport};
