//! CLI tests for the eyeguard binary.
//!
//! - TC-C-001: Replay prints transitions and the summary
//! - TC-C-002: Replay with --json
//! - TC-C-003: Script errors
//! - TC-C-004: Utility subcommands

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const DROWSY_TRIP: &str = r#"
# start, close eyes past the threshold, acknowledge, stop
{"at_ms": 0, "event": {"type": "start_monitoring", "trip_reset": true}}
{"at_ms": 0, "event": {"type": "monitoring_started"}}
{"at_ms": 100, "event": {"type": "eye_sample", "timestamp": 100, "state": "closed"}}
{"at_ms": 700, "event": {"type": "eye_sample", "timestamp": 700, "state": "closed"}}
{"at_ms": 1200, "event": {"type": "eye_sample", "timestamp": 1200, "state": "closed"}}
{"at_ms": 3000, "event": {"type": "acknowledge_alert"}}
{"at_ms": 6000, "event": {"type": "stop_monitoring"}}
"#;

/// Isolated home so the user's config file is never picked up.
fn eyeguard(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("eyeguard").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_script(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("trip.jsonl");
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// TC-C-001: Text replay
// ============================================================================

/// TC-C-001: Alert and summary appear in text output.
#[test]
fn tc_c_001_replay_text() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, DROWSY_TRIP);

    eyeguard(dir.path())
        .arg("replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("[00:00.000] mode -> monitoring"))
        .stdout(predicate::str::contains("[00:01.200] mode -> alert_triggered"))
        .stdout(predicate::str::contains("alarm on"))
        .stdout(predicate::str::contains("alarm off"))
        .stdout(predicate::str::contains("Session summary"))
        .stdout(predicate::str::contains("Focus time: 4 sec"))
        .stdout(predicate::str::contains("Alerts:     1"))
        .stdout(predicate::str::contains("Runs:").not());
}

/// TC-C-001 variant: A higher threshold keeps the trip quiet.
#[test]
fn tc_c_001_threshold_override() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, DROWSY_TRIP);

    eyeguard(dir.path())
        .args(["replay", "--threshold", "2.0"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("alert_triggered").not())
        .stdout(predicate::str::contains("Alerts:     0"));
}

/// TC-C-001 variant: Overrides come on top of a config file.
#[test]
fn tc_c_001_config_file() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, DROWSY_TRIP);
    let config = dir.path().join("eyeguard.json");
    std::fs::write(&config, r#"{"closed_eye_threshold_seconds": 5.0}"#).unwrap();

    eyeguard(dir.path())
        .args(["replay", "--config"])
        .arg(&config)
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("alert_triggered").not());
}

// ============================================================================
// TC-C-002: JSON replay
// ============================================================================

/// TC-C-002: Every stdout line is a JSON event.
#[test]
fn tc_c_002_replay_json() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, DROWSY_TRIP);

    let output = eyeguard(dir.path())
        .args(["replay", "--json"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(events.iter().any(|e| {
        e["at_ms"] == 1200
            && e["event"]["type"] == "mode_changed"
            && e["event"]["value"] == "alert_triggered"
    }));
    let summary = events
        .iter()
        .find(|e| e["event"]["type"] == "session_summary_ready")
        .unwrap();
    assert_eq!(summary["event"]["value"]["alertCount"], 1);
    assert_eq!(summary["event"]["value"]["totalFocusMs"], 4200);
}

// ============================================================================
// TC-C-003: Script errors
// ============================================================================

/// TC-C-003: An unknown event names the offending line.
#[test]
fn tc_c_003_bad_script_line() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "{\"at_ms\": 0, \"event\": {\"type\": \"start_monitoring\"}}\n{\"at_ms\": 5, \"event\": {\"type\": \"warp\"}}\n",
    );

    eyeguard(dir.path())
        .arg("replay")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

/// TC-C-003 variant: Missing script file.
#[test]
fn tc_c_003_missing_script() {
    let dir = TempDir::new().unwrap();

    eyeguard(dir.path())
        .args(["replay", "/nonexistent/trip.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script"));
}

/// TC-C-003 variant: Out-of-range threshold is rejected by the parser.
#[test]
fn tc_c_003_invalid_threshold() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, DROWSY_TRIP);

    eyeguard(dir.path())
        .args(["replay", "--threshold", "0"])
        .arg(&script)
        .assert()
        .failure();
}

// ============================================================================
// TC-C-004: Utility subcommands
// ============================================================================

/// TC-C-004: Suggested break length.
#[test]
fn tc_c_004_break_length() {
    let dir = TempDir::new().unwrap();

    eyeguard(dir.path())
        .args(["break-length", "45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("45 min focus -> 10 min break"));
}

/// TC-C-004: Sound catalog with the driving alarm active by default.
#[test]
fn tc_c_004_sounds() {
    let dir = TempDir::new().unwrap();

    eyeguard(dir.path())
        .arg("sounds")
        .assert()
        .success()
        .stdout(predicate::str::contains("Soft Bell"))
        .stdout(predicate::str::contains("* alarm"));
}

/// TC-C-004: Effective config as JSON.
#[test]
fn tc_c_004_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("eyeguard.json");
    std::fs::write(&config, r#"{"context": "study", "focus_total_seconds": 1500}"#).unwrap();

    let output = eyeguard(dir.path())
        .args(["config", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["context"], "study");
    assert_eq!(value["focus_total_seconds"], 1500);
}

/// TC-C-004: Completion script generation.
#[test]
fn tc_c_004_completions() {
    let dir = TempDir::new().unwrap();

    eyeguard(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eyeguard"));
}
