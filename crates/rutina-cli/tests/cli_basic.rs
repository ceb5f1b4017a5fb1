//! Basic CLI E2E tests.
//!
//! Tests invoke the binary via cargo run against a throwaway home
//! directory, so state and config never touch the real user's files.

use std::path::Path;
use std::process::Command;

use rutina_core::{StateDb, StoredState};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "rutina-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env_remove("RUTINA_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

#[test]
fn test_profile_list_seeds_demo_child() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["profile", "list"]);
    assert!(stdout.contains("Demobarn"));
    assert!(stdout.contains('*'));
}

#[test]
fn test_run_lifecycle() {
    let home = tempfile::tempdir().unwrap();

    let stdout = run_cli_success(home.path(), &["run", "open", "Morgonrutin"]);
    assert!(stdout.contains("\"type\": \"Snapshot\""));

    let stdout = run_cli_success(home.path(), &["run", "start", "morning-wake"]);
    assert!(stdout.contains("\"type\": \"StepStarted\""));

    let stdout = run_cli_success(home.path(), &["run", "status"]);
    assert!(stdout.contains("\"type\": \"Snapshot\""));
    assert!(stdout.contains("Morgonrutin"));

    run_cli_success(home.path(), &["run", "tick"]);

    let stdout = run_cli_success(home.path(), &["run", "pause"]);
    assert!(stdout.contains("\"type\": \"RoutinePaused\""));

    let stdout = run_cli_success(home.path(), &["run", "resume"]);
    assert!(stdout.contains("\"type\": \"RoutineResumed\""));

    let stdout = run_cli_success(home.path(), &["run", "toggle"]);
    assert!(stdout.contains("\"type\": \"RoutinePaused\""));

    let stdout = run_cli_success(home.path(), &["run", "toggle"]);
    assert!(stdout.contains("\"type\": \"RoutineResumed\""));

    let stdout = run_cli_success(home.path(), &["run", "done", "morning-wake"]);
    assert!(stdout.contains("\"type\": \"StepFinished\""));

    let stdout = run_cli_success(home.path(), &["run", "close"]);
    assert!(stdout.contains("Run closed"));
}

#[test]
fn test_start_after_gap_flushes_elapsed_to_prior_step() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["config", "set", "policy.running", "exclusive"]);
    run_cli_success(home.path(), &["run", "open", "Morgonrutin"]);
    run_cli_success(home.path(), &["run", "start", "morning-wake"]);

    // wall time passes with no tick command in between
    std::thread::sleep(std::time::Duration::from_secs(2));
    run_cli_success(home.path(), &["run", "start", "morning-brush"]);

    // the switch demoted the first step and billed it the gap it spent
    // running; the new step has not been charged anything yet
    let db = StateDb::open_at(&home.path().join(".config/rutina/rutina.db")).unwrap();
    let run = StoredState::load(&db).run.unwrap();
    let wake = run.routine().step("morning-wake").unwrap();
    assert!(
        wake.remaining_secs < 120,
        "demoted step kept its full budget: {}",
        wake.remaining_secs
    );
    assert!(wake.remaining_secs >= 60);
    assert_eq!(run.routine().step("morning-brush").unwrap().remaining_secs, 180);
}

#[test]
fn test_run_open_unknown_routine() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["run", "open", "Saknas"]);
    assert!(stdout.contains("Routine not found"));
}

#[test]
fn test_run_status_without_run() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["run", "status"]);
    assert!(stdout.contains("No live run"));
}

#[test]
fn test_routine_edit_reaches_live_run() {
    let home = tempfile::tempdir().unwrap();

    let list = run_cli_success(home.path(), &["routine", "list"]);
    let routine_id = list
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .expect("no routines listed")
        .to_string();

    run_cli_success(home.path(), &["run", "open", &routine_id]);
    let stdout = run_cli_success(
        home.path(),
        &[
            "routine", "add-step", &routine_id, "Extra steg", "--minutes", "1",
        ],
    );
    assert!(stdout.contains("Routine updated"));

    let stdout = run_cli_success(home.path(), &["routine", "show", &routine_id]);
    assert!(stdout.contains("Extra steg"));

    // the live run received the new step through reconciliation
    let stdout = run_cli_success(home.path(), &["run", "status"]);
    assert!(stdout.contains("\"steps_total\": 5"));
}

#[test]
fn test_profile_add_and_select() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["profile", "add", "Alva"]);
    assert!(stdout.contains("Profile created:"));

    let list = run_cli_success(home.path(), &["profile", "list"]);
    assert!(list.contains("Alva"));
    assert!(list.contains("Demobarn"));
}

#[test]
fn test_config_get_and_set() {
    let home = tempfile::tempdir().unwrap();

    let stdout = run_cli_success(home.path(), &["config", "get", "policy.running"]);
    assert_eq!(stdout.trim(), "concurrent");

    run_cli_success(home.path(), &["config", "set", "policy.running", "exclusive"]);
    let stdout = run_cli_success(home.path(), &["config", "get", "policy.running"]);
    assert_eq!(stdout.trim(), "exclusive");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "policy.running", "bogus"]);
    assert_ne!(code, 0);
}

#[test]
fn test_completions_generate() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["completions", "bash"]);
    assert!(!stdout.is_empty());
}
