//! Integration tests for CLI output behavior
//!
//! Each test runs the binary against a throwaway data directory. The default
//! behavior is quiet (no logs); -v/--verbose enables them.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const PROJECT_JSON: &str = r#"{
  "projectName": "demo",
  "services": [{ "serviceName": "carts" }, { "serviceName": "orders" }],
  "stages": [{ "stageName": "dev" }, { "stageName": "staging" }, { "stageName": "prod" }]
}"#;

const SEQUENCES_JSON: &str = r#"[
  {
    "shkeptncontext": "ctx-123",
    "name": "delivery",
    "project": "demo",
    "service": "carts",
    "time": "2024-05-01T12:00:00Z",
    "traces": [
      { "id": "e1", "stage": "dev", "type": "sh.keptn.event.dev.delivery.triggered", "time": "2024-05-01T12:00:00Z" },
      { "id": "e2", "stage": "staging", "type": "sh.keptn.event.staging.delivery.triggered", "time": "2024-05-01T12:05:00Z" },
      { "id": "e3", "stage": "prod", "type": "sh.keptn.event.prod.delivery.triggered", "time": "2024-05-01T12:10:00Z" }
    ]
  },
  {
    "shkeptncontext": "ctx-fail",
    "name": "delivery",
    "project": "demo",
    "service": "orders",
    "time": "2024-05-01T11:00:00Z",
    "traces": [
      { "id": "f1", "stage": "dev", "type": "sh.keptn.event.dev.delivery.triggered", "time": "2024-05-01T11:00:00Z" },
      { "id": "f2", "stage": "dev", "type": "sh.keptn.event.dev.delivery.finished", "time": "2024-05-01T11:03:00Z", "result": "fail" }
    ]
  },
  {
    "shkeptncontext": "ctx-ok",
    "name": "evaluation",
    "project": "demo",
    "service": "carts",
    "time": "2024-05-01T10:00:00Z",
    "traces": [
      { "id": "g1", "stage": "dev", "type": "sh.keptn.event.dev.evaluation.triggered", "time": "2024-05-01T10:00:00Z" },
      { "id": "g2", "stage": "dev", "type": "sh.keptn.event.dev.evaluation.finished", "time": "2024-05-01T10:01:00Z", "result": "pass" }
    ]
  }
]"#;

/// Data directory with a single `demo` project.
fn fixture() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let project_dir = dir.path().join("data").join("demo");
    fs::create_dir_all(&project_dir).expect("Failed to create project dir");
    fs::write(project_dir.join("project.json"), PROJECT_JSON).expect("Failed to write project");
    fs::write(project_dir.join("sequences.json"), SEQUENCES_JSON)
        .expect("Failed to write sequences");
    dir
}

/// Run seqview inside `dir` so no user or project config leaks in.
fn run_seqview(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seqview"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute seqview")
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_seqview(dir, args);
    assert!(
        output.status.success(),
        "seqview {:?} failed with exit code {:?}. stderr: {}",
        args,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_list_stdout_is_clean() {
    let dir = fixture();
    let output = run_seqview(dir.path(), &["list", "demo"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        !stdout.contains(r#""event":"#),
        "stdout should not contain JSON logs, got: {}",
        stdout
    );
    assert!(
        stderr.is_empty(),
        "stderr should be empty in quiet mode, got: {}",
        stderr
    );

    assert!(stdout.contains("Sequences of 'demo' (3 of 3):"));
    assert!(stdout.contains("ctx-123"));
    assert!(stdout.contains("ctx-fail"));
    assert!(stdout.contains("ctx-ok"));
}

#[test]
fn test_verbose_list_logs_to_stderr() {
    let dir = fixture();
    let output = run_seqview(dir.path(), &["-v", "list", "demo"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains(r#""event":"#));
    assert!(
        stderr.contains("cli.list_started"),
        "verbose mode should log to stderr, got: {}",
        stderr
    );
}

#[test]
fn test_list_json_is_parseable() {
    let dir = fixture();
    let stdout = run_ok(dir.path(), &["list", "demo", "--json"]);

    let value: serde_json::Value =
        serde_json::from_str(&stdout).expect("list --json should print valid JSON");
    let list = value.as_array().expect("expected a JSON array");
    assert_eq!(list.len(), 3);

    assert_eq!(list[0]["shkeptncontext"], "ctx-123");
    assert_eq!(list[0]["status"], "started");
    assert_eq!(list[0]["stages"], serde_json::json!(["dev", "staging", "prod"]));
    assert_eq!(list[1]["status"], "failed");
    assert_eq!(list[2]["status"], "succeeded");
}

#[test]
fn test_list_filters_narrow_the_result() {
    let dir = fixture();

    let stdout = run_ok(dir.path(), &["list", "demo", "--json", "-f", "Status=failed"]);
    let list: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["shkeptncontext"], "ctx-fail");

    // Values within a facet are alternatives.
    let stdout = run_ok(
        dir.path(),
        &["list", "demo", "--json", "-f", "Service=carts", "-f", "Service=orders"],
    );
    let list: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(list.len(), 3);

    // A sequence must have visited every selected stage.
    let stdout = run_ok(
        dir.path(),
        &["list", "demo", "--json", "-f", "Stage=dev", "-f", "Stage=prod"],
    );
    let list: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["shkeptncontext"], "ctx-123");
}

#[test]
fn test_list_without_matches() {
    let dir = fixture();
    let stdout = run_ok(dir.path(), &["list", "demo", "-f", "Status=waiting"]);
    assert!(stdout.contains("No sequences match the given filters."));
}

#[test]
fn test_list_rejects_malformed_filter() {
    let dir = fixture();
    let output = run_seqview(dir.path(), &["list", "demo", "-f", "Status"]);
    assert!(!output.status.success());
}

#[test]
fn test_list_missing_project_fails() {
    let dir = fixture();
    let output = run_seqview(dir.path(), &["list", "nope"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Project 'nope' not found"),
        "stderr should name the missing project, got: {}",
        stderr
    );
}

#[test]
fn test_data_flag_overrides_default_dir() {
    let dir = fixture();
    let moved = dir.path().join("elsewhere");
    fs::rename(dir.path().join("data"), &moved).unwrap();

    let output = run_seqview(dir.path(), &["list", "demo"]);
    assert!(!output.status.success());

    let stdout = run_ok(
        dir.path(),
        &["--data", moved.to_str().unwrap(), "list", "demo"],
    );
    assert!(stdout.contains("ctx-123"));
}

#[test]
fn test_facets_output() {
    let dir = fixture();
    let stdout = run_ok(dir.path(), &["facets", "demo"]);

    assert!(stdout.contains("Service:  carts, orders"), "got: {}", stdout);
    assert!(stdout.contains("Stage:    dev, staging, prod"), "got: {}", stdout);
    assert!(stdout.contains("Sequence: delivery, evaluation"), "got: {}", stdout);
    assert!(stdout.contains("Status:"), "got: {}", stdout);
}

#[test]
fn test_show_selects_last_stage() {
    let dir = fixture();
    let stdout = run_ok(dir.path(), &["show", "demo", "ctx-123", "--json"]);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["stage"], "prod");
    assert_eq!(value["route"], "/project/demo/sequence/ctx-123/stage/prod");
    assert_eq!(value["status"], "started");
    // Started long before the live window: offered for manual reload.
    assert_eq!(value["offer_reload"], true);
}

#[test]
fn test_show_event_resolves_its_stage() {
    let dir = fixture();
    let stdout = run_ok(
        dir.path(),
        &["show", "demo", "ctx-123", "--event", "e2", "--json"],
    );

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["stage"], "staging");
    assert_eq!(value["event_id"], "e2");
    assert_eq!(value["route"], "/project/demo/sequence/ctx-123/event/e2");
}

#[test]
fn test_show_text_output() {
    let dir = fixture();
    let stdout = run_ok(dir.path(), &["show", "demo", "ctx-fail", "--stage", "dev"]);

    assert!(stdout.contains("Sequence ctx-fail (delivery) in demo"));
    assert!(stdout.contains("Status:   Failed"));
    assert!(stdout.contains("Stage:    dev"));
    assert!(stdout.contains("[fail]"));
}

#[test]
fn test_show_unknown_context_fails() {
    let dir = fixture();
    let output = run_seqview(dir.path(), &["show", "demo", "ctx-missing"]);
    assert!(!output.status.success());
}

#[test]
fn test_show_stage_and_event_conflict() {
    let dir = fixture();
    let output = run_seqview(
        dir.path(),
        &["show", "demo", "ctx-123", "--stage", "dev", "--event", "e1"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_watch_stops_after_duration() {
    let dir = fixture();
    let stdout = run_ok(dir.path(), &["watch", "demo", "--duration", "1"]);

    assert!(stdout.contains("Watching project 'demo'"));
    assert!(
        stdout.contains("demo: 3 sequences"),
        "watch should print a summary line, got: {}",
        stdout
    );
}

#[test]
fn test_watch_missing_project_fails() {
    let dir = fixture();
    let output = run_seqview(dir.path(), &["watch", "nope", "--duration", "1"]);
    assert!(!output.status.success());
}
