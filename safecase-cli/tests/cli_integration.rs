//! CLI integration tests for safecase-cli.
//!
//! These tests run the actual binary and check outputs and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const THREAT_TEXT: &str =
    "I know where you live. You better do what I say or I'll share those photos with everyone.";

/// Get a Command for the safecase binary.
fn safecase() -> Command {
    Command::cargo_bin("safecase").unwrap()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    safecase()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Evidence classification"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("support"));
}

#[test]
fn test_version_displays_version() {
    safecase()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("safecase"));
}

#[test]
fn test_help_shows_exit_codes() {
    safecase()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("69"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    safecase().arg("seal").assert().code(64);
}

// ============================================================================
// Classify Tests
// ============================================================================

#[test]
fn test_classify_harmful_text_exits_2() {
    safecase()
        .args(["classify", THREAT_TEXT])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("CRITICAL"))
        .stdout(predicate::str::contains("threat, coercion, exposure"));
}

#[test]
fn test_classify_benign_text_exits_0() {
    safecase()
        .args(["classify", "Meeting at 5pm, bring the documents."])
        .assert()
        .success()
        .stdout(predicate::str::contains("No harmful content detected"));
}

#[test]
fn test_classify_json_output() {
    let output = safecase()
        .args(["classify", "--json", "If you tell anyone I will hurt you."])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["threat_level"], "medium");
    assert_eq!(json["matched_categories"], serde_json::json!(["threat"]));
}

#[test]
fn test_classify_from_file_and_stdin() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messages.txt");
    fs::write(&path, THREAT_TEXT).unwrap();

    safecase()
        .args(["classify", "--quiet", "--file"])
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());

    safecase()
        .args(["classify", "-"])
        .write_stdin("have a nice day")
        .assert()
        .success();
}

#[test]
fn test_classify_missing_file_is_input_error() {
    safecase()
        .args(["classify", "--file", "/nonexistent/messages.txt"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_classify_without_text_is_usage_error() {
    safecase().arg("classify").assert().code(64);
}

// ============================================================================
// Scan Tests
// ============================================================================

#[test]
fn test_scan_document_has_no_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("letter.pdf");
    fs::write(&path, b"%PDF-1.7 not really").unwrap();

    let output = safecase().args(["scan", "--json"]).arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "document");
    assert_eq!(json["media_type"], "application/pdf");
    assert_eq!(json["threat_level"], "none");
    assert_eq!(json["sha3_256"].as_str().unwrap().len(), 64);
}

#[test]
fn test_scan_image_without_ocr_is_clean() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("screenshot.png");
    fs::write(&path, b"not actually a png").unwrap();

    safecase()
        .arg("scan")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("image"))
        .stdout(predicate::str::contains("(no text)"));
}

#[test]
fn test_scan_empty_file_is_input_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.jpg");
    fs::write(&path, b"").unwrap();

    safecase()
        .arg("scan")
        .arg(&path)
        .assert()
        .code(66)
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_scan_unreachable_ocr_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("screenshot.png");
    fs::write(&path, b"pixels").unwrap();

    safecase()
        .args(["scan", "--quiet", "--ocr-timeout", "20", "--ocr-url", "http://127.0.0.1:9"])
        .arg(&path)
        .assert()
        .code(69);
}

#[test]
fn test_scan_rejects_non_http_ocr_url() {
    safecase()
        .args(["scan", "--ocr-url", "ftp://example.org", "x.png"])
        .assert()
        .code(64);
}

// ============================================================================
// Support Tests
// ============================================================================

#[test]
fn test_support_lists_directory() {
    safecase()
        .arg("support")
        .assert()
        .success()
        .stdout(predicate::str::contains("Legal Aid"))
        .stdout(predicate::str::contains("Emergency Services (911)"));
}

#[test]
fn test_support_recommendations_for_critical() {
    let output = safecase()
        .args(["support", "--json", "--threat-level", "critical"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["category"], "emergency");
}

#[test]
fn test_support_unknown_category_is_usage_error() {
    safecase()
        .args(["support", "--category", "astrology"])
        .assert()
        .code(64);
}
