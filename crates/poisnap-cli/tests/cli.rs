//! End-to-end tests for the poisnap binary.
//!
//! Everything here runs with `--policy none` so no network or model
//! backend is ever contacted.

use assert_cmd::Command;
use predicates::prelude::*;

fn poisnap() -> Command {
    Command::cargo_bin("poisnap").unwrap()
}

#[test]
fn help_lists_subcommands() {
    poisnap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("backends"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn scan_rules_only_emits_json_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sign.txt");
    std::fs::write(
        &input,
        "ラーメン一番\nTEL 03-1234-5678\n営業時間 11:00-22:00",
    )
    .unwrap();

    poisnap()
        .arg("scan")
        .arg(&input)
        .arg("--policy")
        .arg("none")
        .assert()
        .success()
        .stdout(predicate::str::contains("03-1234-5678"))
        .stdout(predicate::str::contains("ラーメン一番"))
        .stdout(predicate::str::contains("11:00-22:00"));
}

#[test]
fn scan_text_format_shows_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sign.txt");
    std::fs::write(&input, "カフェ モカ\n東京都渋谷区神南1-2-3").unwrap();

    poisnap()
        .arg("scan")
        .arg(&input)
        .arg("--policy")
        .arg("none")
        .arg("--format")
        .arg("text")
        .arg("--show-confidence")
        .assert()
        .success()
        .stdout(predicate::str::contains("Name:"))
        .stdout(predicate::str::contains("カフェ モカ"))
        .stdout(predicate::str::contains("Extraction confidence"));
}

#[test]
fn scan_missing_file_fails() {
    poisnap()
        .arg("scan")
        .arg("/nonexistent/sign.txt")
        .arg("--policy")
        .arg("none")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn scan_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sign.pdf");
    std::fs::write(&input, b"%PDF-1.4").unwrap();

    poisnap()
        .arg("scan")
        .arg(&input)
        .arg("--policy")
        .arg("none")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn scan_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sign.txt");
    let output = dir.path().join("poi.json");
    std::fs::write(&input, "焼肉 大将\nTEL: 06-6123-4567").unwrap();

    poisnap()
        .arg("scan")
        .arg(&input)
        .arg("--policy")
        .arg("none")
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("06-6123-4567"));
    assert!(written.contains("焼肉 大将"));
}

#[test]
fn batch_writes_records_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "カフェ モカ\nTEL 03-1111-2222").unwrap();
    std::fs::write(
        dir.path().join("b.txt"),
        "居酒屋 ほたる\n東京都新宿区西新宿1-2-3",
    )
    .unwrap();
    let out = dir.path().join("out");

    poisnap()
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .arg("--policy")
        .arg("none")
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success();

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt"));
    assert!(summary.contains("b.txt"));
    assert!(summary.contains("success"));
    assert!(summary.contains("03-1111-2222"));
}

#[test]
fn batch_no_matches_fails() {
    let dir = tempfile::tempdir().unwrap();

    poisnap()
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .arg("--policy")
        .arg("none")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_path_reports_location() {
    poisnap()
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}
