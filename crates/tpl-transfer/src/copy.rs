//! File and directory copy
//!
//! A directory copy first materializes the full file list (so totals are
//! known before work starts), then runs the per-file copies through a
//! bounded-concurrency stream. Items are admitted in discovery order as
//! slots free up; completion order is undefined.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::engine::TransferEngine;
use crate::error::{Error, Result};
use crate::progress::{Forwarder, ProgressSink, Reporter};
use crate::report::{FailureKind, TransferReport};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Default cap on concurrently in-flight file operations.
///
/// Template shares are network mounts; a modest bound parallelizes I/O
/// latency without exhausting handles on large trees.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Options for [`TransferEngine::copy_file`] and
/// [`TransferEngine::copy_directory`].
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Replace an existing destination instead of failing with
    /// `DestinationExists`.
    pub overwrite: bool,
    /// Hard cap on simultaneously in-flight file copies (directory
    /// operations only). Values below 1 are treated as 1.
    pub max_concurrency: usize,
    /// Compare source and destination checksums after each copy.
    pub verify: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            verify: false,
        }
    }
}

impl TransferEngine {
    /// Copy a single file to `dst`.
    ///
    /// The destination never holds a partial file: bytes stream into a
    /// staging file that is renamed into place only after a full, synced
    /// write. Returns the number of bytes copied.
    pub async fn copy_file(
        &self,
        src: &Path,
        dst: &Path,
        options: &CopyOptions,
        sink: Option<Arc<dyn ProgressSink>>,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let (reporter, forwarder) = Forwarder::spawn(sink);
        let label = dst
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dst.display().to_string());

        let result = copy_one(
            src,
            dst,
            &label,
            options.overwrite,
            options.verify,
            &reporter,
            cancel,
        )
        .await;

        drop(reporter);
        forwarder.finish().await;
        result
    }

    /// Copy a directory tree to `dst` with bounded concurrency.
    ///
    /// One file's failure never aborts its siblings; per-item failures are
    /// collected into the returned [`TransferReport`]. The call itself only
    /// fails when the source directory is missing or unreadable.
    /// Cancellation stops admitting queued files immediately; files already
    /// copied stay copied and are reported as succeeded.
    pub async fn copy_directory(
        &self,
        src: &Path,
        dst: &Path,
        options: &CopyOptions,
        sink: Option<Arc<dyn ProgressSink>>,
        cancel: &CancellationToken,
    ) -> Result<TransferReport> {
        match fs::metadata(src).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(Error::source_not_found(src)),
        }

        let enumeration = {
            let src = src.to_path_buf();
            tokio::task::spawn_blocking(move || enumerate(&src))
                .await
                .map_err(|e| Error::io(dst, std::io::Error::other(e)))??
        };
        debug!(
            files = enumeration.files.len(),
            dirs = enumeration.dirs.len(),
            src = %src.display(),
            "enumerated source tree"
        );

        let mut report = TransferReport::default();
        for (rel, message) in enumeration.walk_failures {
            report.failed.insert(rel, FailureKind::Io(message));
        }

        // Mirror the directory skeleton up front so empty directories
        // survive the copy.
        fs::create_dir_all(dst)
            .await
            .map_err(|e| Error::io(dst, e))?;
        for rel in &enumeration.dirs {
            let target = dst.join(rel);
            if let Err(e) = fs::create_dir_all(&target).await {
                report.failed.insert(rel.clone(), FailureKind::Io(e.to_string()));
            }
        }

        let (reporter, forwarder) = Forwarder::spawn(sink);
        let max_concurrency = options.max_concurrency.max(1);

        let outcomes = stream::iter(enumeration.files.into_iter().map(|rel| {
            let src_path = src.join(&rel);
            let dst_path = dst.join(&rel);
            let label = rel.to_string_lossy().into_owned();
            let reporter = reporter.clone();
            let cancel = cancel.clone();
            let overwrite = options.overwrite;
            let verify = options.verify;
            async move {
                // Admission checkpoint: a cancelled batch takes no new work.
                if cancel.is_cancelled() {
                    return (rel, None);
                }
                let outcome = copy_one(
                    &src_path, &dst_path, &label, overwrite, verify, &reporter, &cancel,
                )
                .await;
                (rel, Some(outcome))
            }
        }))
        .buffer_unordered(max_concurrency)
        .collect::<Vec<_>>()
        .await;

        drop(reporter);
        forwarder.finish().await;

        for (rel, outcome) in outcomes {
            match outcome {
                None | Some(Err(Error::Cancelled)) => {}
                Some(Ok(bytes)) => {
                    report.bytes_transferred += bytes;
                    report.succeeded.insert(rel);
                }
                Some(Err(err)) => {
                    warn!(item = %rel.display(), error = %err, "item failed, batch continues");
                    report.failed.insert(rel, FailureKind::from_error(&err));
                }
            }
        }
        report.cancelled = cancel.is_cancelled();
        Ok(report)
    }
}

#[derive(Default)]
struct Enumeration {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
    walk_failures: Vec<(PathBuf, String)>,
}

/// Walk `src` into a fixed list of files and directories.
///
/// Paths are source-relative. Failures below the root are collected per
/// item; an unreadable root fails the enumeration outright.
fn enumerate(src: &Path) -> Result<Enumeration> {
    std::fs::read_dir(src).map_err(|_| Error::source_not_found(src))?;

    let mut enumeration = Enumeration::default();
    for entry in WalkDir::new(src).min_depth(1) {
        match entry {
            Ok(entry) => {
                let Ok(rel) = entry.path().strip_prefix(src) else {
                    continue;
                };
                let file_type = entry.file_type();
                if file_type.is_dir() {
                    enumeration.dirs.push(rel.to_path_buf());
                } else if file_type.is_file() {
                    enumeration.files.push(rel.to_path_buf());
                } else {
                    debug!(path = %entry.path().display(), "skipping non-regular file");
                }
            }
            Err(err) => {
                let rel = err
                    .path()
                    .and_then(|p| p.strip_prefix(src).ok())
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                enumeration.walk_failures.push((rel, err.to_string()));
            }
        }
    }
    Ok(enumeration)
}

/// Copy one file through a staging path.
async fn copy_one(
    src: &Path,
    dst: &Path,
    label: &str,
    overwrite: bool,
    verify: bool,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Result<u64> {
    let meta = match fs::metadata(src).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::source_not_found(src));
        }
        Err(e) => return Err(Error::io(src, e)),
    };
    if !meta.is_file() {
        return Err(Error::source_not_found(src));
    }
    if !overwrite && fs::metadata(dst).await.is_ok() {
        return Err(Error::DestinationExists {
            path: dst.to_path_buf(),
        });
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }

    let staging = tpl_fs::io::staging_path(dst);
    let result = stream_to_staging(src, dst, &staging, label, meta.len(), reporter, cancel).await;
    if result.is_err() {
        let _ = fs::remove_file(&staging).await;
        return result;
    }

    if verify {
        verify_copy(src, dst).await?;
    }
    result
}

async fn stream_to_staging(
    src: &Path,
    dst: &Path,
    staging: &Path,
    label: &str,
    total: u64,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut reader = fs::File::open(src).await.map_err(|e| Error::io(src, e))?;
    let mut writer = fs::File::create(staging)
        .await
        .map_err(|e| Error::io(staging, e))?;

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut done: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let read = reader.read(&mut buf).await.map_err(|e| Error::io(src, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buf[..read])
            .await
            .map_err(|e| Error::io(staging, e))?;
        done += read as u64;
        reporter.report(label, done, Some(total)).await;
    }

    writer.sync_all().await.map_err(|e| Error::io(staging, e))?;
    drop(writer);
    fs::rename(staging, dst).await.map_err(|e| Error::io(dst, e))?;
    Ok(done)
}

/// Compare source and destination checksums, removing the destination on
/// mismatch so no corrupt file stays under its final name.
async fn verify_copy(src: &Path, dst: &Path) -> Result<()> {
    let src_owned = src.to_path_buf();
    let dst_owned = dst.to_path_buf();
    let matches = tokio::task::spawn_blocking(move || {
        let src_sum = tpl_fs::checksum::file_checksum(&src_owned)?;
        let dst_sum = tpl_fs::checksum::file_checksum(&dst_owned)?;
        Ok::<bool, std::io::Error>(src_sum == dst_sum)
    })
    .await
    .map_err(|e| Error::io(dst, std::io::Error::other(e)))?
    .map_err(|e| Error::io(dst, e))?;

    if !matches {
        let _ = fs::remove_file(dst).await;
        return Err(Error::ChecksumMismatch {
            path: dst.to_path_buf(),
        });
    }
    Ok(())
}
