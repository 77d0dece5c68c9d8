//! End-to-end integration tests for CLI commands
//!
//! These tests verify the full pipeline for:
//! - `stepwise run` - Drive a demo to its stop condition
//! - `stepwise list` - Describe demo routines
//! - `stepwise completions` - Shell completion output
//!
//! Every command runs in an empty temporary directory with the STEPWISE_*
//! variables cleared, so no stray configuration leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// `stepwise` command isolated from the environment
fn stepwise(dir: &TempDir) -> Command {
    let mut cmd = Command::from(assert_cmd::cargo::cargo_bin_cmd!("stepwise"));
    cmd.current_dir(dir.path())
        .env_remove("STEPWISE_MAX_TICKS")
        .env_remove("STEPWISE_LOG")
        .env_remove("STEPWISE_TRACE")
        .env_remove("STEPWISE_JSON");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

// ============================================================================
// stepwise run - Success Cases
// ============================================================================

#[test]
fn test_run_scenario_output() {
    let dir = TempDir::new().unwrap();
    let stdout = stdout_of(stepwise(&dir).args(["run", "scenario"]));

    insta::assert_snapshot!(stdout, @r"
    5
    5
    5
    Scenario ended
    stopped after 6 ticks
    ");
}

#[test]
fn test_run_scenario_trace() {
    let dir = TempDir::new().unwrap();
    let stdout = stdout_of(stepwise(&dir).args(["run", "scenario", "--trace"]));

    insta::assert_snapshot!(stdout, @r"
    [tick 1] Scenario start -> #1 (suspended)
    5
    [tick 2] Scenario #1 -> #1 (suspended)
    5
    [tick 3] Scenario #1 -> #1 (suspended)
    5
    [tick 4] Scenario #1 -> #2 (suspended)
    [tick 5] Scenario #2 -> completed (finished)
    Scenario ended
    [tick 6] Scenario completed -> completed (idle)
    stopped after 6 ticks
    ");
}

#[test]
fn test_run_expensive_by_default() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("timer: 10"))
        .stdout(predicate::str::contains("this is state 1: 0"))
        .stdout(predicate::str::contains("ExpensiveOperation ended"))
        .stdout(predicate::str::ends_with("stopped after 14 ticks\n"));
}

#[test]
fn test_run_sieve_json_report() {
    let dir = TempDir::new().unwrap();
    let stdout = stdout_of(stepwise(&dir).args(["run", "sieve", "--json"]));

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["demo"], "sieve");
    assert_eq!(report["stop"], "all-complete");
    assert_eq!(report["completions"][0]["routine"], "Sieve");
    let last = report["output"].as_array().unwrap().last().unwrap();
    assert!(last
        .as_str()
        .unwrap()
        .starts_with("primes up to 100: 2 3 5 7 11"));
    assert!(report.get("trace").is_none());
}

// ============================================================================
// stepwise run - Configuration
// ============================================================================

#[test]
fn test_run_reads_config_from_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("stepwise.toml"),
        "[demo]\ny = 42\ntimer = 2\n",
    )
    .unwrap();

    stepwise(&dir)
        .args(["run", "expensive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timer: 2"))
        .stdout(predicate::str::contains("this is state 1: 42"))
        .stdout(predicate::str::contains("timer: 10").not());
}

#[test]
fn test_run_with_explicit_config_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.toml");
    fs::write(&path, "[demo]\nsieve_limit = 10\n").unwrap();

    stepwise(&dir)
        .args(["run", "sieve", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("primes up to 10: 2 3 5 7"));
}

#[test]
fn test_env_tick_budget() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .args(["run", "expensive"])
        .env("STEPWISE_MAX_TICKS", "5")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("tick limit of 5 reached"));
}

#[test]
fn test_flag_overrides_config_stop() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("stepwise.toml"),
        "[driver]\nstop = \"first-ended\"\n",
    )
    .unwrap();

    stepwise(&dir)
        .args(["run", "expensive", "--stop", "all-complete"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("stopped after 16 ticks\n"));
}

// ============================================================================
// stepwise run - Error Cases
// ============================================================================

#[test]
fn test_tick_limit_exit_code() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .args(["run", "expensive", "--max-ticks", "3"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Demo 'expensive' did not stop"));
}

#[test]
fn test_invalid_config_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("stepwise.toml"), "[demo]\ntimer = 0\n").unwrap();

    stepwise(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load stepwise.toml"));
}

#[test]
fn test_missing_explicit_config() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .args(["run", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_unknown_demo() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .args(["run", "fireworks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'fireworks'"));
}

// ============================================================================
// stepwise list / completions
// ============================================================================

#[test]
fn test_list_text() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ExpensiveOperation (manual numbering, 4 segments)",
        ))
        .stdout(predicate::str::contains("OtherOperation (manual numbering, 16 segments)"));
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    let stdout = stdout_of(stepwise(&dir).args(["list", "--json"]));

    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 4);
    assert_eq!(entries[0]["resume_points"], serde_json::json!([0, 1, 2, 3]));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();

    stepwise(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_stepwise"));
}
