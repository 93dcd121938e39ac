#![allow(deprecated)]
use assert_cmd::Command;
use chrono::{TimeDelta, Utc};
use predicates::prelude::*;
use recall_core::snapshot::{SessionContext, SessionSnapshot};
use recall_core::writer::write_snapshot;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};
use tempfile::TempDir;

const CONFIG: &str = "\
project:
  name: shop
context:
  critical_rules:
    - No hardcoded values
  deployment:
    host: example.org
  workflow:
    - build
    - upload
";

fn recall(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("recall").unwrap();
    cmd.current_dir(dir.path())
        .env("RECALL_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init_project(dir: &TempDir) {
    std::fs::create_dir_all(dir.path().join(".recall")).unwrap();
    std::fs::write(dir.path().join(".recall/config.yaml"), CONFIG).unwrap();
}

fn snapshot_dir(dir: &TempDir) -> PathBuf {
    dir.path().join(".recall/snapshots")
}

fn snapshot_files(dir: &TempDir) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(snapshot_dir(dir))
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("snapshot_")
        })
        .collect();
    files.sort();
    files
}

fn write_todos(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("todos.json");
    std::fs::write(
        &path,
        r#"[
            {"content": "A", "status": "completed"},
            {"content": "B", "status": "in_progress"},
            {"content": "C", "status": "pending"}
        ]"#,
    )
    .unwrap();
    path
}

// ---------------------------------------------------------------------------
// recall pre-compact
// ---------------------------------------------------------------------------

#[test]
fn pre_compact_writes_snapshot_and_latest() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    recall(&dir)
        .arg("pre-compact")
        .write_stdin(r#"{"hook_event_name": "PreCompact"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Session snapshot saved"));

    let files = snapshot_files(&dir);
    assert_eq!(files.len(), 1);
    let latest = std::fs::read(snapshot_dir(&dir).join("latest.json")).unwrap();
    assert_eq!(std::fs::read(&files[0]).unwrap(), latest);

    let snap: SessionSnapshot = serde_json::from_slice(&latest).unwrap();
    assert_eq!(snap.session_context.project, "shop");
    assert_eq!(snap.session_context.critical_rules, vec!["No hardcoded values"]);
    assert_eq!(snap.session_context.deployment["host"], "example.org");
}

#[test]
fn pre_compact_keeps_older_snapshots() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    recall(&dir).arg("pre-compact").assert().success();
    let first = snapshot_files(&dir);
    let first_bytes = std::fs::read(&first[0]).unwrap();

    recall(&dir)
        .args(["pre-compact", "--agent", "debugger"])
        .assert()
        .success();

    let files = snapshot_files(&dir);
    assert_eq!(files.len(), 2);
    assert_eq!(std::fs::read(&first[0]).unwrap(), first_bytes);
    let latest = std::fs::read_to_string(snapshot_dir(&dir).join("latest.json")).unwrap();
    assert!(latest.contains("debugger"));
}

#[test]
fn pre_compact_json_reports_paths() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let output = recall(&dir)
        .args(["pre-compact", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["path"].as_str().unwrap().contains("snapshot_"));
    assert!(value["latest"].as_str().unwrap().ends_with("latest.json"));
}

#[test]
fn pre_compact_failure_still_exits_zero() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".recall")).unwrap();
    std::fs::write(
        dir.path().join(".recall/config.yaml"),
        "snapshots:\n  dir: blocker\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("blocker"), "a file, not a directory").unwrap();

    recall(&dir)
        .arg("pre-compact")
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to write session snapshot"));
}

#[test]
fn pre_compact_without_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    recall(&dir).arg("pre-compact").assert().success();
    assert!(snapshot_dir(&dir).join("latest.json").exists());
}

#[test]
fn pre_compact_with_bad_todos_still_saves() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(dir.path().join("todos.json"), "not json").unwrap();

    recall(&dir)
        .args(["pre-compact", "--todos", "todos.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("without todos"));
    assert_eq!(snapshot_files(&dir).len(), 1);
}

// ---------------------------------------------------------------------------
// recall post-compact
// ---------------------------------------------------------------------------

#[test]
fn post_compact_restores_written_snapshot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let todos = write_todos(&dir);

    recall(&dir)
        .arg("pre-compact")
        .arg("--todos")
        .arg(&todos)
        .args(["--last-file", "app/Models/Product.php"])
        .assert()
        .success();

    recall(&dir)
        .arg("post-compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SESSION RECOVERED AFTER CONTEXT COMPACTION",
        ))
        .stdout(predicate::str::contains(
            "Tasks: 1 completed, 1 in progress, 1 pending",
        ))
        .stdout(predicate::str::contains("Interrupted task: B"))
        .stdout(predicate::str::contains(
            "Last file read: app/Models/Product.php",
        ))
        .stdout(predicate::str::contains("Recovery options:"));
}

#[test]
fn post_compact_without_snapshot_prints_fallback() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    recall(&dir)
        .arg("post-compact")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent session snapshot"))
        .stdout(predicate::str::contains("shop").not());
}

#[test]
fn post_compact_with_corrupt_snapshot_falls_back() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::create_dir_all(snapshot_dir(&dir)).unwrap();
    std::fs::write(snapshot_dir(&dir).join("latest.json"), b"{{{ garbage").unwrap();

    recall(&dir)
        .arg("post-compact")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent session snapshot"))
        .stderr(predicate::str::contains("unreadable"));
}

#[test]
fn post_compact_with_stale_snapshot_falls_back() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let ctx = SessionContext {
        project: "shop".to_string(),
        ..SessionContext::default()
    };
    let old = SessionSnapshot::capture(ctx, Utc::now() - TimeDelta::hours(30));
    write_snapshot(&snapshot_dir(&dir), &old).unwrap();

    let output = recall(&dir).arg("post-compact").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("No recent session snapshot"));

    // Same fallback as the absent case, byte for byte.
    let empty = TempDir::new().unwrap();
    let absent = recall(&empty).arg("post-compact").output().unwrap();
    assert_eq!(stdout.as_bytes(), absent.stdout.as_slice());
}

#[test]
fn post_compact_json_is_clean_on_stdout() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::create_dir_all(snapshot_dir(&dir)).unwrap();
    std::fs::write(snapshot_dir(&dir).join("latest.json"), "[]").unwrap();

    let output = recall(&dir)
        .args(["post-compact", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["outcome"], "corrupt");
    assert!(!value["diagnostic"].as_str().unwrap().is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn hooks_survive_closed_stdout() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join("CLAUDE.md"),
        "## Critical Rules\n- Verify in the browser\n",
    )
    .unwrap();
    let bin = assert_cmd::cargo::cargo_bin("recall");

    for hook in ["pre-compact", "post-compact", "session-start"] {
        let mut child = StdCommand::new(&bin)
            .arg(hook)
            .env("RECALL_ROOT", dir.path())
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        // Close the reading end before the hook can print anything: it only
        // writes once stdin hits EOF.
        drop(child.stdout.take());
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(&vec![b'x'; 64 * 1024]).unwrap();
        drop(stdin);

        let output = child.wait_with_output().unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(0), "{hook}: {stderr}");
        assert!(!stderr.contains("panicked"), "{hook}: {stderr}");
    }
}

#[test]
fn hooks_drain_large_stdin() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let payload = "x".repeat(8 * 1024 * 1024);

    for hook in ["pre-compact", "post-compact", "session-start"] {
        recall(&dir)
            .arg(hook)
            .write_stdin(payload.clone())
            .timeout(std::time::Duration::from_secs(60))
            .assert()
            .success();
    }
}

// ---------------------------------------------------------------------------
// recall session-start
// ---------------------------------------------------------------------------

#[test]
fn session_start_appends_instruction_digest() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join("CLAUDE.md"),
        "# Guide\n\n## Critical Rules\n- Verify in the browser\n\n## Other\n- hidden\n",
    )
    .unwrap();

    recall(&dir)
        .arg("session-start")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent session snapshot"))
        .stdout(predicate::str::contains("Project reminders (from CLAUDE.md)"))
        .stdout(predicate::str::contains("- Verify in the browser"))
        .stdout(predicate::str::contains("hidden").not());
}

#[test]
fn session_start_without_instructions_prints_report_only() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir).arg("pre-compact").assert().success();

    recall(&dir)
        .arg("session-start")
        .assert()
        .success()
        .stdout(predicate::str::contains("SESSION RECOVERED"))
        .stdout(predicate::str::contains("Project reminders").not());
}

// ---------------------------------------------------------------------------
// recall list / show
// ---------------------------------------------------------------------------

#[test]
fn list_shows_newest_first() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let ctx = SessionContext::default();
    let older = SessionSnapshot::capture(ctx.clone(), Utc::now() - TimeDelta::hours(2));
    let newer = SessionSnapshot::capture(ctx, Utc::now() - TimeDelta::hours(1));
    let older = write_snapshot(&snapshot_dir(&dir), &older).unwrap();
    let newer = write_snapshot(&snapshot_dir(&dir), &newer).unwrap();

    let output = recall(&dir).arg("list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let older_name = older.path.file_name().unwrap().to_string_lossy().into_owned();
    let newer_name = newer.path.file_name().unwrap().to_string_lossy().into_owned();
    let older_pos = stdout.find(&older_name).unwrap();
    let newer_pos = stdout.find(&newer_name).unwrap();
    assert!(newer_pos < older_pos);
    assert!(!stdout.contains("latest.json"));
}

#[test]
fn list_empty() {
    let dir = TempDir::new().unwrap();
    recall(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No snapshots"));
}

#[test]
fn show_latest() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir).arg("pre-compact").assert().success();

    recall(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"project\": \"shop\""));
}

#[test]
fn show_without_snapshot_prints_note() {
    let dir = TempDir::new().unwrap();
    recall(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No snapshot at"))
        .stdout(predicate::str::contains("latest.json"));
}

#[test]
fn show_corrupt_latest_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::create_dir_all(snapshot_dir(&dir)).unwrap();
    std::fs::write(snapshot_dir(&dir).join("latest.json"), "{").unwrap();

    recall(&dir)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn show_named_snapshot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir).arg("pre-compact").assert().success();
    let files = snapshot_files(&dir);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();

    recall(&dir)
        .args(["show", &name])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"project\": \"shop\""));
}

#[test]
fn show_rejects_paths_outside_snapshot_dir() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir).arg("pre-compact").assert().success();
    let outside = dir.path().join("snapshot_outside.json");
    std::fs::copy(snapshot_dir(&dir).join("latest.json"), &outside).unwrap();

    for name in [
        "../../snapshot_outside.json".to_string(),
        outside.display().to_string(),
    ] {
        recall(&dir)
            .args(["show", &name])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid snapshot name"));
    }
}

// ---------------------------------------------------------------------------
// recall init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_snapshot_dir() {
    let dir = TempDir::new().unwrap();
    recall(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    let config = recall_core::config::Config::load(dir.path()).unwrap();
    assert_eq!(config.recovery.freshness_hours, 24);
    assert!(snapshot_dir(&dir).is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using existing"));
    let content = std::fs::read_to_string(dir.path().join(".recall/config.yaml")).unwrap();
    assert_eq!(content, CONFIG);
}

#[test]
fn config_validate_ok() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK."));
}

#[test]
fn config_validate_rejects_zero_freshness() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".recall")).unwrap();
    std::fs::write(
        dir.path().join(".recall/config.yaml"),
        "project:\n  name: shop\nrecovery:\n  freshness_hours: 0\n",
    )
    .unwrap();
    recall(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("freshness_hours"));
}

#[test]
fn config_show_fills_defaults() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recall(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("freshness_hours: 24"));
}
