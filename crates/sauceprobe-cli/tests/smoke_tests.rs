//! Smoke tests for the sauceprobe CLI
//!
//! Every journey here runs against the simulated storefront.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the sauceprobe binary
fn sauceprobe() -> Command {
    let mut cmd = Command::cargo_bin("sauceprobe").expect("sauceprobe binary should exist");
    cmd.env_remove("RUST_LOG")
        .env_remove("SAUCEPROBE_PERSONA")
        .env_remove("SAUCEPROBE_BASE_URL")
        .env_remove("SAUCEPROBE_CONFIG");
    cmd
}

/// Write a config with short waits so failing journeys finish quickly
fn brisk_config(dir: &TempDir) -> String {
    let path = dir.path().join("suite.yaml");
    fs::write(
        &path,
        "timings:\n  element_timeout_ms: 500\n  poll_interval_ms: 20\n  glitch_login_grace_ms: 2000\n  network_settle_ms: 20\n",
    )
    .unwrap();
    path.to_str().unwrap().to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    sauceprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    sauceprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saucedemo"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("journeys"));
}

#[test]
fn test_no_args_fails() {
    sauceprobe().assert().failure();
}

// ============================================================================
// Listing Commands
// ============================================================================

#[test]
fn test_journeys_command() {
    sauceprobe()
        .arg("journeys")
        .assert()
        .success()
        .stdout(predicate::str::contains("purchase"))
        .stdout(predicate::str::contains("form-error"));
}

#[test]
fn test_personas_command() {
    sauceprobe()
        .arg("personas")
        .assert()
        .success()
        .stdout(predicate::str::contains("performance_glitch_user"))
        .stdout(predicate::str::contains("LockedOut"));
}

#[test]
fn test_catalog_command() {
    sauceprobe()
        .args(["catalog", "--page", "checkout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checkout-step-one.html"))
        .stdout(predicate::str::contains("finish"));
}

#[test]
fn test_config_prints_defaults() {
    sauceprobe()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url: https://www.saucedemo.com"));
}

#[test]
fn test_config_check_missing_file() {
    sauceprobe()
        .args(["config", "--check", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.yaml"));
}

// ============================================================================
// Simulated Runs
// ============================================================================

#[test]
fn test_simulated_purchase_writes_report() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("purchase.json");
    sauceprobe()
        .args(["run", "purchase", "--simulate", "--seed", "11", "--color", "never"])
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED purchase"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["journey"], "purchase");
    assert_eq!(json["persona"], "standard_user");
    assert_eq!(json["seed"], 11);
    assert_eq!(json["steps"].as_array().unwrap().len(), 9);
    assert!(!fs::read_to_string(&report).unwrap().contains("secret_sauce"));
}

#[test]
fn test_simulated_run_warns_about_browser_options() {
    sauceprobe()
        .args(["run", "login", "--simulate", "--headed", "--no-sandbox", "--color", "never"])
        .assert()
        .success()
        .stderr(predicate::str::contains("browser options have no effect"));
}

#[test]
fn test_simulated_locked_out_login_passes() {
    sauceprobe()
        .args(["run", "login", "--simulate", "-p", "locked_out_user"])
        .assert()
        .success();
}

#[test]
fn test_unknown_persona_fails() {
    sauceprobe()
        .args(["run", "login", "--simulate", "--persona", "visual_user"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown user type: visual_user"));
}

#[test]
fn test_unknown_journey_fails() {
    sauceprobe()
        .args(["run", "wishlist", "--simulate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown journey 'wishlist'"));
}

#[test]
fn test_failed_journey_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = brisk_config(&dir);
    sauceprobe()
        .args(["run", "purchase", "--simulate", "--persona", "problem_user", "--color", "never"])
        .args(["--config", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAIL"))
        .stderr(predicate::str::contains("Journey 'purchase' failed at step 6"));
}

#[test]
fn test_config_defined_journey() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("suite.yaml");
    fs::write(
        &path,
        r#"journeys:
  browse:
    - Given the user opens the storefront
    - When the user authenticates as "standard_user" with password "secret_sauce"
    - Then the user validates item images
"#,
    )
    .unwrap();
    sauceprobe()
        .args(["run", "browse", "--simulate", "--config"])
        .arg(&path)
        .assert()
        .success();
}
