//! E2E tests for the catalog-wide commands: `requires`, `cycles`, `levels`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn pensum_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pensum"));
    cmd.current_dir(dir);
    cmd.env("PENSUM_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

/// 1 → 2 → 3, 4 ⇄ 5, 5 → 6, 2 ~ 7. Course `n` is worth `n` credits.
fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.json");
    let catalog = serde_json::json!({
        "courses": (1..=7)
            .map(|n| serde_json::json!({
                "id": n,
                "code": format!("C-{n}"),
                "name": format!("Course {n}"),
                "credits": n,
            }))
            .collect::<Vec<_>>(),
        "relations": [
            {"from": 1, "to": 2, "kind": "prerequisite"},
            {"from": 2, "to": 3, "kind": "prerequisite"},
            {"from": 4, "to": 5, "kind": "prerequisite"},
            {"from": 5, "to": 4, "kind": "prerequisite"},
            {"from": 5, "to": 6, "kind": "prerequisite"},
            {"from": 7, "to": 2, "kind": "corequisite"},
            {"from": 3, "to": 42, "kind": "prerequisite"}
        ]
    });
    std::fs::write(&path, catalog.to_string()).expect("write catalog");
    path
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn cycles_lists_mutual_prerequisites() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    let json = json_of(pensum_cmd(dir.path()).args(["cycles", "--json"]).arg(&catalog));
    assert_eq!(json["cycles"], serde_json::json!([[4, 5]]));
}

#[test]
fn cycles_pretty_output() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    pensum_cmd(dir.path())
        .args(["cycles", "--format", "pretty"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle 1: 4 → 5 → 4"))
        .stdout(predicate::str::contains("4 — C-4"));
}

#[test]
fn levels_report_blocked_courses() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    let json = json_of(pensum_cmd(dir.path()).args(["levels", "--json"]).arg(&catalog));
    assert_eq!(json["layers"], serde_json::json!([[1, 7], [2], [3]]));
    assert_eq!(json["unassigned"], serde_json::json!([4, 5, 6]));
    assert_eq!(json["assigned"], 4);
    assert_eq!(json["total"], 7);
}

#[test]
fn requires_lists_direct_and_transitive() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    let json = json_of(
        pensum_cmd(dir.path())
            .args(["requires", "--json"])
            .arg(&catalog)
            .arg("3"),
    );
    assert_eq!(json["target"], 3);
    assert_eq!(json["direct_prerequisites"], serde_json::json!([2]));
    assert_eq!(json["all_prerequisites"], serde_json::json!([1, 2]));
    assert_eq!(json["corequisites"], serde_json::json!([]));
    assert_eq!(json["prerequisite_count"], 2);
    assert_eq!(json["required_credits_total"], 3);
}

#[test]
fn requires_accepts_course_code() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    let json = json_of(
        pensum_cmd(dir.path())
            .args(["requires", "--json"])
            .arg(&catalog)
            .arg("c-3"),
    );
    assert_eq!(json["target"], 3);
    assert_eq!(json["all_prerequisites"], serde_json::json!([1, 2]));
}

#[test]
fn requires_text_output() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    pensum_cmd(dir.path())
        .args(["requires", "--format", "text"])
        .arg(&catalog)
        .arg("2")
        .assert()
        .success()
        .stdout("direct\t1\ncorequisite\t7\ncredits\t1\n");
}

#[test]
fn malformed_catalog_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "[1, 2, 3]").expect("write");

    pensum_cmd(dir.path())
        .args(["levels", "--json"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1004"));
}

#[test]
fn unknown_course_code_fails() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_catalog(dir.path());

    pensum_cmd(dir.path())
        .args(["requires", "--json"])
        .arg(&catalog)
        .arg("C-99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn completions_mention_binary_name() {
    let dir = TempDir::new().expect("tempdir");
    pensum_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pensum"));
}

#[test]
fn completions_written_to_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pensum.bash");
    pensum_cmd(dir.path())
        .args(["completions", "bash", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout("");
    let script = std::fs::read_to_string(&path).expect("read script");
    assert!(script.contains("pensum"));
}
