//! Atomic file writes
//!
//! All writes that land under a final destination name go through a staging
//! file in the same directory followed by a rename, so a crashed or failed
//! write never leaves a half-written file where a complete one is expected.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Staging-file name for `dest`, in the same directory.
///
/// Same directory means same filesystem, which keeps the final rename
/// atomic. The process id keeps concurrent runs apart.
pub fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.{}.part", name, std::process::id()))
}

/// Write `content` to `path` atomically.
///
/// Writes into a staging file under an exclusive advisory lock, syncs, then
/// renames over the destination. The staging file is removed on any failure.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let staging = staging_path(path);
    let result = write_staged(&staging, path, content);
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_staged(staging: &Path, dest: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(staging)
        .map_err(|e| Error::io(staging, e))?;

    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: dest.to_path_buf(),
    })?;

    file.write_all(content).map_err(|e| Error::io(staging, e))?;
    file.sync_all().map_err(|e| Error::io(staging, e))?;

    fs2::FileExt::unlock(&file).map_err(|_| Error::LockFailed {
        path: dest.to_path_buf(),
    })?;

    fs::rename(staging, dest).map_err(|e| Error::io(dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("out.txt");

        write_atomic(&dest, b"payload").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        fs::write(&dest, "old").unwrap();

        write_atomic(&dest, b"new").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn no_staging_file_remains_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");

        write_atomic(&dest, b"payload").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn staging_path_stays_in_destination_directory() {
        let staging = staging_path(Path::new("/some/dir/file.txt"));
        assert_eq!(staging.parent(), Some(Path::new("/some/dir")));
        let name = staging.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".file.txt."));
        assert!(name.ends_with(".part"));
    }
}
