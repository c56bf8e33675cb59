//! End-to-end properties of the transfer engine

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use tpl_fs::checksum::file_checksum;
use tpl_test_utils::TreeFixture;
use tpl_transfer::{CopyOptions, ProgressEvent, ProgressSink, TransferEngine};

fn assert_no_staging_files(root: &Path) {
    for entry in walk(root) {
        let name = entry.file_name().unwrap_or_default().to_string_lossy();
        assert!(
            !name.ends_with(".part"),
            "staging file left behind: {}",
            entry.display()
        );
    }
}

fn walk(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            out.push(path);
        }
    }
    out
}

#[tokio::test]
async fn copied_files_hash_identically_to_their_sources() {
    let fixture = TreeFixture::new()
        .file("src/report.docx", "lots of document bytes")
        .file("src/data/numbers.csv", "1,2,3\n4,5,6\n");

    let engine = TransferEngine::new();
    let dst = fixture.path("dst");
    let report = engine
        .copy_directory(
            &fixture.path("src"),
            &dst,
            &CopyOptions::default(),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(report.is_complete());
    for rel in &report.succeeded {
        let src_sum = file_checksum(&fixture.path("src").join(rel)).unwrap();
        let dst_sum = file_checksum(&dst.join(rel)).unwrap();
        assert_eq!(src_sum, dst_sum, "mismatch for {}", rel.display());
    }
    assert_no_staging_files(fixture.root());
}

#[tokio::test]
async fn directory_copy_is_idempotent_against_fresh_destinations() {
    let fixture = TreeFixture::new()
        .file("src/a.txt", "alpha")
        .file("src/nested/b.txt", "beta")
        .file("src/nested/deep/c.txt", "gamma")
        .dir("src/empty");

    let engine = TransferEngine::new();
    let mut runs = Vec::new();
    for destination in ["dst1", "dst2"] {
        let report = engine
            .copy_directory(
                &fixture.path("src"),
                &fixture.path(destination),
                &CopyOptions::default(),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(report.is_complete());
        runs.push(report.succeeded);
    }

    assert_eq!(runs[0], runs[1]);
    for rel in &runs[0] {
        assert_eq!(
            file_checksum(&fixture.path("dst1").join(rel)).unwrap(),
            file_checksum(&fixture.path("dst2").join(rel)).unwrap(),
        );
    }
    assert!(fixture.path("dst1/empty").is_dir());
    assert!(fixture.path("dst2/empty").is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn one_unreadable_file_does_not_fail_the_batch() {
    let mut fixture = TreeFixture::new();
    for i in 0..8 {
        fixture = fixture.file(&format!("src/file{i}.txt"), "readable");
    }
    let fixture = fixture.unreadable_file("src/locked.txt");

    let engine = TransferEngine::new();
    let report = engine
        .copy_directory(
            &fixture.path("src"),
            &fixture.path("dst"),
            &CopyOptions {
                max_concurrency: 3,
                ..Default::default()
            },
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.succeeded.len(), 8);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed.contains_key(Path::new("locked.txt")));
    assert!(!fixture.path("dst/locked.txt").exists());
    assert_no_staging_files(fixture.root());
}

/// Cancels the batch as soon as the marker item starts reporting progress.
struct CancelOnItem {
    marker: String,
    token: CancellationToken,
}

impl ProgressSink for CancelOnItem {
    fn on_progress(&self, event: ProgressEvent) {
        if event.item == self.marker {
            self.token.cancel();
        }
    }
}

#[tokio::test]
async fn cancellation_keeps_completed_items_and_leaves_no_partials() {
    // Small files ahead of one large pacer file ahead of more small files;
    // with a concurrency of 1 the small head completes before the pacer
    // starts, and the tail is never admitted once the token fires.
    let mut fixture = TreeFixture::new();
    for i in 0..10 {
        fixture = fixture.file(&format!("src/head{i:02}.txt"), "head");
    }
    fixture = fixture.file("src/pacer.bin", &"x".repeat(4 * 1024 * 1024));
    for i in 0..10 {
        fixture = fixture.file(&format!("src/tail{i:02}.txt"), "tail");
    }

    let cancel = CancellationToken::new();
    let sink = Arc::new(CancelOnItem {
        marker: "pacer.bin".to_string(),
        token: cancel.clone(),
    });

    let engine = TransferEngine::new();
    let report = engine
        .copy_directory(
            &fixture.path("src"),
            &fixture.path("dst"),
            &CopyOptions {
                max_concurrency: 1,
                ..Default::default()
            },
            Some(sink),
            &cancel,
        )
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(report.failed.is_empty());
    assert!(report.succeeded.len() < 21, "cancellation had no effect");

    // Everything reported as succeeded is fully present; everything else
    // is entirely absent.
    let all: BTreeSet<PathBuf> = fixture
        .file_list()
        .into_iter()
        .filter_map(|rel| rel.strip_prefix("src").ok().map(Path::to_path_buf))
        .collect();
    for rel in &all {
        let dst = fixture.path("dst").join(rel);
        if report.succeeded.contains(rel) {
            assert_eq!(
                file_checksum(&fixture.path("src").join(rel)).unwrap(),
                file_checksum(&dst).unwrap(),
            );
        } else {
            assert!(!dst.exists(), "partial file for {}", rel.display());
        }
    }
    assert_no_staging_files(fixture.root());
}

#[tokio::test]
async fn destination_tree_matches_source_tree_exactly() {
    let fixture = TreeFixture::new()
        .file("src/one.txt", "1")
        .file("src/sub/two.txt", "22")
        .file("src/sub/three.txt", "333");

    let engine = TransferEngine::new();
    let report = engine
        .copy_directory(
            &fixture.path("src"),
            &fixture.path("dst"),
            &CopyOptions::default(),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let expected: BTreeSet<PathBuf> = ["one.txt", "sub/two.txt", "sub/three.txt"]
        .iter()
        .map(PathBuf::from)
        .collect();
    assert_eq!(report.succeeded, expected);
    assert_eq!(report.bytes_transferred, 6);
}
