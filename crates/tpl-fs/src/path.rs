//! Virtual drive mapping and path resolution
//!
//! Workstations reach the template shares through mapped drive letters
//! (`T:`, `N:`, ...). The mapping is not guaranteed to be present on every
//! machine, so paths are resolved against a substitution table to their UNC
//! form before any I/O. An unreachable share is a normal condition and shows
//! up as `exists: false`, never as an error.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Builtin substitution table from drive letters to network roots.
///
/// Matches the drive layout of the school file server; callers that need a
/// different layout build a [`DriveMap`] of their own instead of editing
/// this table.
pub const BUILTIN_DRIVE_MAP: &[(char, &str)] = &[
    ('T', r"\\server\t_lernende"),
    ('N', r"\\server\n_home-s"),
    ('S', r"\\server\s_mitarbeiter"),
    ('U', r"\\server\u_archiv"),
];

/// A resolved path: the caller's spelling plus its real, probed form.
///
/// Immutable once produced; owns no OS resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// The path exactly as the caller supplied it.
    pub requested: String,
    /// The path after drive-letter substitution.
    pub real: PathBuf,
    /// Whether `real` was reachable at resolution time.
    pub exists: bool,
    /// Whether `real` points at a network root (UNC form).
    pub is_network: bool,
}

impl ResolvedPath {
    /// Canonical form of the real path for display purposes.
    ///
    /// Falls back to the uncanonicalized path when the target is absent.
    pub fn canonical(&self) -> PathBuf {
        dunce::canonicalize(&self.real).unwrap_or_else(|_| self.real.clone())
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.real.display())
    }
}

/// Reachability of one mapped drive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootStatus {
    pub letter: char,
    pub root: PathBuf,
    pub reachable: bool,
}

/// Substitution table from drive-letter tokens to real roots.
#[derive(Debug, Clone)]
pub struct DriveMap {
    entries: Vec<(char, String)>,
}

impl DriveMap {
    /// The builtin table (see [`BUILTIN_DRIVE_MAP`]).
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_DRIVE_MAP
                .iter()
                .map(|(letter, root)| (*letter, (*root).to_string()))
                .collect(),
        }
    }

    /// An empty table; every drive letter passes through unchanged.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replace or add the mapping for `letter`.
    ///
    /// The letter is case-insensitive; the root may be a UNC root or a plain
    /// local directory (useful on hosts without mapped drives).
    pub fn with_mapping(mut self, letter: char, root: impl Into<String>) -> Self {
        let letter = letter.to_ascii_uppercase();
        let root = root.into();
        match self.entries.iter_mut().find(|(l, _)| *l == letter) {
            Some(entry) => entry.1 = root,
            None => self.entries.push((letter, root)),
        }
        self
    }

    /// Look up the root mapped to `letter`, if any.
    pub fn root_for(&self, letter: char) -> Option<&str> {
        let letter = letter.to_ascii_uppercase();
        self.entries
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, root)| root.as_str())
    }

    /// Resolve a raw path against the table.
    ///
    /// A matched drive prefix is substituted by its mapped root; the
    /// remainder of the path is carried over byte for byte. Unmapped drive
    /// letters and prefix-free paths pass through with only the drive letter
    /// case-normalized. Resolution probes existence but never creates
    /// anything, and an unreachable target is reported through `exists`,
    /// not as an error.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath> {
        if raw.is_empty() {
            return Err(Error::invalid_path(raw, "empty path"));
        }

        let real = match split_drive_prefix(raw) {
            Some((letter, remainder)) => match self.root_for(letter) {
                Some(root) => {
                    debug!(drive = %letter, %root, "remapped virtual drive");
                    format!("{root}{remainder}")
                }
                None => normalize(raw),
            },
            None => normalize(raw),
        };

        let is_network = is_unc(&real);
        let real = PathBuf::from(real);
        // Any probe failure (absent share, timeout, permission) reads as
        // "not there right now".
        let exists = std::fs::metadata(&real).is_ok();

        Ok(ResolvedPath {
            requested: raw.to_string(),
            real,
            exists,
            is_network,
        })
    }

    /// Probe every mapped root and report reachability.
    ///
    /// Read-only; intended for a startup health check before the first
    /// transfer touches a share.
    pub fn check_roots(&self) -> Vec<RootStatus> {
        self.entries
            .iter()
            .map(|(letter, root)| {
                let root = PathBuf::from(root);
                let reachable = std::fs::metadata(&root).is_ok();
                RootStatus {
                    letter: *letter,
                    root,
                    reachable,
                }
            })
            .collect()
    }
}

impl Default for DriveMap {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Split `raw` into a drive letter and the rest, if it has a `X:` prefix.
fn split_drive_prefix(raw: &str) -> Option<(char, &str)> {
    let mut chars = raw.chars();
    let letter = chars.next()?;
    if letter.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some((letter.to_ascii_uppercase(), &raw[2..]))
    } else {
        None
    }
}

/// Case-normalize a drive-letter prefix, leaving the remainder untouched.
fn normalize(raw: &str) -> String {
    match split_drive_prefix(raw) {
        Some((letter, remainder)) => format!("{letter}:{remainder}"),
        None => raw.to_string(),
    }
}

fn is_unc(path: &str) -> bool {
    path.starts_with("\\\\") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r"T:\E\LIVE", r"\\server\t_lernende\E\LIVE")]
    #[case(r"t:\E\LIVE", r"\\server\t_lernende\E\LIVE")]
    #[case("T:/E/LIVE", r"\\server\t_lernende/E/LIVE")]
    #[case(r"N:\home", r"\\server\n_home-s\home")]
    #[case(r"U:", r"\\server\u_archiv")]
    fn mapped_prefix_is_substituted(#[case] raw: &str, #[case] expected: &str) {
        let resolved = DriveMap::builtin().resolve(raw).unwrap();
        assert_eq!(resolved.real, PathBuf::from(expected));
        assert!(resolved.is_network);
        assert_eq!(resolved.requested, raw);
    }

    #[rstest]
    #[case(r"c:\Windows", r"C:\Windows")]
    #[case(r"X:\anything", r"X:\anything")]
    #[case("relative/path.txt", "relative/path.txt")]
    #[case("no-drive", "no-drive")]
    fn unmapped_input_passes_through(#[case] raw: &str, #[case] expected: &str) {
        let resolved = DriveMap::builtin().resolve(raw).unwrap();
        assert_eq!(resolved.real, PathBuf::from(expected));
        assert!(!resolved.is_network);
    }

    #[test]
    fn empty_input_is_invalid() {
        let err = DriveMap::builtin().resolve("").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn local_override_resolves_and_probes() {
        let dir = tempfile::tempdir().unwrap();
        let map = DriveMap::empty().with_mapping('T', dir.path().to_string_lossy());

        let resolved = map.resolve("T:/sub.txt").unwrap();
        assert!(!resolved.exists);
        assert!(!resolved.is_network);

        std::fs::write(dir.path().join("sub.txt"), "x").unwrap();
        let resolved = map.resolve("T:/sub.txt").unwrap();
        assert!(resolved.exists);
    }

    #[test]
    fn unreachable_share_is_not_an_error() {
        let resolved = DriveMap::builtin().resolve(r"T:\does\not\exist").unwrap();
        assert!(!resolved.exists);
        assert!(resolved.is_network);
    }

    #[test]
    fn with_mapping_replaces_existing_entry() {
        let map = DriveMap::builtin().with_mapping('t', r"\\other\t_share");
        assert_eq!(map.root_for('T'), Some(r"\\other\t_share"));
        // Unrelated entries are untouched.
        assert_eq!(map.root_for('N'), Some(r"\\server\n_home-s"));
    }

    #[test]
    fn check_roots_reports_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let map = DriveMap::empty()
            .with_mapping('T', dir.path().to_string_lossy())
            .with_mapping('U', r"\\server\does_not_exist");

        let statuses = map.check_roots();
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].reachable);
        assert!(!statuses[1].reachable);
    }

    proptest::proptest! {
        /// The remainder after a mapped prefix is carried over byte for byte.
        #[test]
        fn mapped_remainder_is_byte_identical(rest in r"[a-zA-Z0-9_/\\. -]{0,40}") {
            let raw = format!("S:{rest}");
            let resolved = DriveMap::builtin().resolve(&raw).unwrap();
            let real = resolved.real.to_string_lossy().into_owned();
            let remainder = real.strip_prefix(r"\\server\s_mitarbeiter").unwrap();
            proptest::prop_assert_eq!(remainder, rest.as_str());
        }
    }
}
