//! Source-tree fixtures on a tempdir

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A disposable file tree for transfer and registry tests.
///
/// Relative paths passed to the builder methods are created under a fresh
/// [`TempDir`] that is removed on drop.
pub struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create fixture tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Create a file (and its parent directories) with the given content.
    pub fn file(self, rel: &str, content: &str) -> Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parents");
        }
        fs::write(&path, content).expect("write fixture file");
        self
    }

    /// Create an empty directory.
    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.path(rel)).expect("create fixture dir");
        self
    }

    /// Create a file that cannot be opened for reading.
    ///
    /// Unix only; tests exercising unreadable-file behavior should be
    /// `#[cfg(unix)]`.
    #[cfg(unix)]
    pub fn unreadable_file(self, rel: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let this = self.file(rel, "unreadable");
        fs::set_permissions(this.path(rel), fs::Permissions::from_mode(0o000))
            .expect("chmod fixture file");
        this
    }

    /// Collect all file paths under the root, relative, sorted.
    pub fn file_list(&self) -> Vec<PathBuf> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else if let Ok(rel) = path.strip_prefix(root) {
                    out.push(rel.to_path_buf());
                }
            }
        }
        let mut out = Vec::new();
        walk(self.root(), self.root(), &mut out);
        out.sort();
        out
    }
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_files_and_lists_them() {
        let fixture = TreeFixture::new()
            .file("a.txt", "a")
            .file("sub/b.txt", "b")
            .dir("empty");

        assert_eq!(
            fixture.file_list(),
            vec![PathBuf::from("a.txt"), PathBuf::from("sub/b.txt")]
        );
        assert!(fixture.path("empty").is_dir());
    }
}
