//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get an hbt command
pub fn hbt() -> Command {
    Command::new(cargo::cargo_bin!("hbt"))
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    hbt()
        .current_dir(tmp.path())
        .args(["init", "--operator", "Test Operator"])
        .assert()
        .success();
    tmp
}

/// Helper to register a collection event, returning its id
pub fn create_test_collection(tmp: &TempDir, herb: &str, quantity: &str) -> String {
    let output = hbt()
        .current_dir(tmp.path())
        .args([
            "collect",
            "new",
            "--herb",
            herb,
            "--quantity",
            quantity,
            "--format",
            "id",
        ])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to start a processing batch from a collection, returning its id
pub fn create_test_batch(tmp: &TempDir, source: &str) -> String {
    let output = hbt()
        .current_dir(tmp.path())
        .args(["batch", "new", source, "--format", "id"])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to record a lab test against a batch, returning its id
pub fn create_test_lab_test(tmp: &TempDir, batch: &str, measurements: [&str; 4]) -> String {
    let output = hbt()
        .current_dir(tmp.path())
        .args([
            "lab",
            "new",
            batch,
            "--moisture",
            measurements[0],
            "--dna-match",
            measurements[1],
            "--pesticide",
            measurements[2],
            "--temperature",
            measurements[3],
            "--format",
            "id",
        ])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Measurements comfortably inside every threshold
pub const PASSING_MEASUREMENTS: [&str; 4] = ["10.2", "96.8", "0.08", "21.5"];

/// Measurements that fail every threshold
pub const FAILING_MEASUREMENTS: [&str; 4] = ["13.5", "82.1", "0.7", "27.8"];

/// Helper to read one record's status out of `show --format json`
pub fn record_status(tmp: &TempDir, subcommand: &str, id: &str) -> String {
    let output = hbt()
        .current_dir(tmp.path())
        .args([subcommand, "show", id, "--format", "json"])
        .output()
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("show --format json emits valid JSON");
    json["status"].as_str().unwrap_or_default().to_string()
}
