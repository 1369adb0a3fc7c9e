//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "podmon-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Pod Monitor"),
        "Should show app name"
    );
    assert!(stdout.contains("stats"), "Should show stats command");
    assert!(
        stdout.contains("namespaces"),
        "Should show namespaces command"
    );
    assert!(stdout.contains("pods"), "Should show pods command");
    assert!(stdout.contains("errors"), "Should show errors command");
    assert!(stdout.contains("resolve"), "Should show resolve command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "podmon-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("podmon"), "Should show binary name");
}

/// Test errors pod subcommand help
#[test]
fn test_errors_pod_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "podmon-cli", "--", "errors", "pod", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Errors pod help should succeed");
    assert!(stdout.contains("--limit"), "Should show limit option");
}

/// Test errors recent subcommand help
#[test]
fn test_errors_recent_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "podmon-cli", "--", "errors", "recent", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Errors recent help should succeed");
    assert!(stdout.contains("--limit"), "Should show limit option");
}

/// Test resolve command help
#[test]
fn test_resolve_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "podmon-cli", "--", "resolve", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Resolve help should succeed");
    assert!(stdout.contains("--step"), "Should show step option");
    assert!(
        stdout.contains("manual_required"),
        "Should document status values"
    );
}

/// Commands that need a pod id should reject non-numeric input
#[test]
fn test_pods_rejects_non_numeric_id() {
    let output = Command::new("cargo")
        .args(["run", "-p", "podmon-cli", "--", "pods", "not-a-number"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Non-numeric id should fail");
}
