//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn list_shows_registered_actions() {
    Command::cargo_bin("tpl")
        .unwrap()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered Actions"))
        .stdout(predicate::str::contains("Create Document"))
        .stdout(predicate::str::contains("Rename Project"));
}

#[test]
fn list_json_is_machine_readable() {
    let output = Command::cargo_bin("tpl")
        .unwrap()
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let actions = parsed.as_array().unwrap();
    assert!(!actions.is_empty());
    for action in actions {
        assert!(action.get("name").is_some());
        assert!(action.get("category").is_some());
        assert!(action.get("enabled").is_some());
    }
}

#[test]
fn paths_reports_unreachable_builtin_shares() {
    // The builtin UNC roots do not exist on the test host.
    Command::cargo_bin("tpl")
        .unwrap()
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mapped Drive Roots"))
        .stdout(predicate::str::contains("unreachable"));
}

#[test]
fn malformed_drive_mapping_is_rejected() {
    Command::cargo_bin("tpl")
        .unwrap()
        .args(["--map", "bogus", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid mapping"));
}
