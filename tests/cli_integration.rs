//! Integration tests for the `vb` CLI.
//!
//! Each test creates a temp board, runs `vb` as a subprocess, and checks
//! stdout, exit status and the files under `.vibe/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

/// Get the path to the built `vb` binary.
fn vb_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("vb");
    path
}

/// Run `vb` with the given args in the given directory, returning (stdout, stderr, success).
fn run_vb(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(vb_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("VIBE_LOG")
        .output()
        .expect("failed to run vb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `vb` expecting success, return stdout.
fn run_vb_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_vb(dir, args);
    if !success {
        panic!(
            "vb {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `vb --json ...` expecting success, parse stdout.
fn run_vb_json(dir: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    serde_json::from_str(&run_vb_ok(dir, &full)).unwrap()
}

/// Create a board and return the temp dir holding it.
fn new_board() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    run_vb_ok(tmp.path(), &["init", "--name", "Test Board"]);
    tmp
}

/// Add a task and return its id.
fn add_task(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    run_vb_ok(dir, &full).trim().to_string()
}

fn titles(column: &Value) -> Vec<String> {
    column
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

fn column_of(dir: &Path, id: &str) -> String {
    let task = run_vb_json(dir, &["show", id]);
    task["column"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_board_and_seeds_labels() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_vb_ok(tmp.path(), &["init", "--name", "Home"]);
    assert!(out.contains("Initialized board: Home"));
    assert!(tmp.path().join(".vibe/board.toml").exists());
    assert!(tmp.path().join(".vibe/store.json").exists());

    let labels = run_vb_json(tmp.path(), &["label"]);
    let names: Vec<&str> = labels
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bug", "Design", "Docs", "Feature", "Urgent"]);
}

#[test]
fn test_init_twice_fails() {
    let tmp = new_board();
    let (_, stderr, success) = run_vb(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_init_no_seed_then_seed() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_vb_ok(tmp.path(), &["init", "--no-seed"]);
    assert_eq!(run_vb_json(tmp.path(), &["label"]), serde_json::json!([]));

    let out = run_vb_ok(tmp.path(), &["seed"]);
    assert!(out.contains("bug"));
    let out = run_vb_ok(tmp.path(), &["seed"]);
    assert!(out.contains("nothing to seed"));
}

#[test]
fn test_command_outside_board_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_vb(tmp.path(), &["board"]);
    assert!(!success);
    assert!(stderr.contains("not a vibe board"));
}

#[test]
fn test_board_dir_flag() {
    let tmp = new_board();
    let elsewhere = tempfile::TempDir::new().unwrap();
    let board_path = tmp.path().to_str().unwrap();
    run_vb_ok(elsewhere.path(), &["-C", board_path, "add", "Remote task"]);
    let todo = run_vb_json(tmp.path(), &["list", "todo"]);
    assert_eq!(titles(&todo), vec!["Remote task"]);
}

// ---------------------------------------------------------------------------
// Ordering and filtering
// ---------------------------------------------------------------------------

#[test]
fn test_overdue_high_before_undated_low() {
    let tmp = new_board();
    let yesterday = (chrono::Local::now().date_naive() - chrono::Duration::days(1)).to_string();
    add_task(tmp.path(), &["Write docs", "--priority", "low"]);
    add_task(
        tmp.path(),
        &["Fix bug", "--priority", "high", "--due", &yesterday],
    );

    let todo = run_vb_json(tmp.path(), &["list", "todo"]);
    assert_eq!(titles(&todo), vec!["Fix bug", "Write docs"]);
    assert_eq!(todo[0]["overdue"], Value::Bool(true));

    let human = run_vb_ok(tmp.path(), &["list", "todo"]);
    assert!(human.lines().next().unwrap().contains("OVERDUE"));
}

#[test]
fn test_priority_then_age() {
    let tmp = new_board();
    add_task(tmp.path(), &["older high", "-p", "high"]);
    add_task(tmp.path(), &["medium"]);
    add_task(tmp.path(), &["newer high", "-p", "high"]);

    let todo = run_vb_json(tmp.path(), &["list", "todo"]);
    assert_eq!(titles(&todo), vec!["older high", "newer high", "medium"]);
}

#[test]
fn test_board_filters() {
    let tmp = new_board();
    add_task(tmp.path(), &["Crash on save", "--label", "Bug", "-p", "high"]);
    add_task(
        tmp.path(),
        &["Guide", "--description", "explains the CRASH report", "--label", "docs"],
    );
    add_task(tmp.path(), &["Logo", "--label", "design", "--column", "in-progress"]);

    let board = run_vb_json(tmp.path(), &["board", "--search", "crash"]);
    assert_eq!(titles(&board[0]["tasks"]), vec!["Crash on save", "Guide"]);
    assert_eq!(board[1]["tasks"], serde_json::json!([]));

    let board = run_vb_json(tmp.path(), &["board", "--label", "docs", "--label", "design"]);
    assert_eq!(titles(&board[0]["tasks"]), vec!["Guide"]);
    assert_eq!(titles(&board[1]["tasks"]), vec!["Logo"]);

    let board = run_vb_json(tmp.path(), &["board", "--priority", "high"]);
    assert_eq!(titles(&board[0]["tasks"]), vec!["Crash on save"]);
}

#[test]
fn test_board_human_output_has_columns() {
    let tmp = new_board();
    add_task(tmp.path(), &["Something"]);
    let out = run_vb_ok(tmp.path(), &["board"]);
    assert!(out.starts_with("Test Board\n"));
    assert!(out.contains("== Todo (1) =="));
    assert!(out.contains("== In Progress (0) =="));
    assert!(out.contains("== Complete (0) =="));
    assert!(!out.contains("Archive"));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_move_archive_restore() {
    let tmp = new_board();
    let id = add_task(tmp.path(), &["Ship it"]);

    run_vb_ok(tmp.path(), &["mv", &id, "in-progress"]);
    assert_eq!(column_of(tmp.path(), &id), "in-progress");

    // Archiving needs the task to be complete
    let (_, stderr, success) = run_vb(tmp.path(), &["archive", &id]);
    assert!(!success);
    assert!(stderr.contains("cannot archive a task in in-progress"));

    run_vb_ok(tmp.path(), &["mv", &id, "complete"]);
    run_vb_ok(tmp.path(), &["archive", &id]);
    assert_eq!(column_of(tmp.path(), &id), "archive");

    let archived = run_vb_json(tmp.path(), &["board", "--archive"]);
    assert_eq!(titles(&archived[0]["tasks"]), vec!["Ship it"]);

    let (_, _, success) = run_vb(tmp.path(), &["mv", &id, "todo"]);
    assert!(!success);

    run_vb_ok(tmp.path(), &["restore", &id]);
    assert_eq!(column_of(tmp.path(), &id), "complete");
}

#[test]
fn test_short_id_suffix_resolves() {
    let tmp = new_board();
    let id = add_task(tmp.path(), &["Short"]);
    let suffix = &id[id.len() - 8..];
    run_vb_ok(tmp.path(), &["mv", suffix, "complete"]);
    assert_eq!(column_of(tmp.path(), &id), "complete");
}

#[test]
fn test_rm_deletes_task() {
    let tmp = new_board();
    let id = add_task(tmp.path(), &["Doomed"]);
    run_vb_ok(tmp.path(), &["rm", &id]);
    let (_, stderr, success) = run_vb(tmp.path(), &["show", &id]);
    assert!(!success);
    assert!(stderr.contains("task not found"));
}

#[test]
fn test_edit_replaces_fields() {
    let tmp = new_board();
    let id = add_task(tmp.path(), &["Draft", "--label", "bug", "--due", "2030-01-01"]);

    run_vb_ok(
        tmp.path(),
        &["edit", &id, "--title", "Final", "--label", "docs", "--clear-due"],
    );
    let task = run_vb_json(tmp.path(), &["show", &id]);
    assert_eq!(task["title"], "Final");
    assert_eq!(task["labels"], serde_json::json!(["docs"]));
    assert!(task.get("due_date").is_none());

    let (_, stderr, success) = run_vb(tmp.path(), &["edit", &id]);
    assert!(!success);
    assert!(stderr.contains("nothing to change"));

    let (_, stderr, success) = run_vb(tmp.path(), &["edit", &id, "--title", "  "]);
    assert!(!success);
    assert!(stderr.contains("title must not be empty"));
}

#[test]
fn test_subtasks() {
    let tmp = new_board();
    let id = add_task(tmp.path(), &["Parent", "--sub", "one"]);
    run_vb_ok(tmp.path(), &["sub", "add", &id, "two"]);
    run_vb_ok(tmp.path(), &["sub", "toggle", &id, "2"]);

    let out = run_vb_ok(tmp.path(), &["show", &id]);
    assert!(out.contains("subtasks (1/2):"));
    assert!(out.contains("1. [ ] one"));
    assert!(out.contains("2. [x] two"));

    run_vb_ok(tmp.path(), &["sub", "rm", &id, "1"]);
    let task = run_vb_json(tmp.path(), &["show", &id]);
    assert_eq!(task["subtasks"].as_array().unwrap().len(), 1);
    assert_eq!(task["subtasks"][0]["text"], "two");
}

// ---------------------------------------------------------------------------
// Selection and bulk operations
// ---------------------------------------------------------------------------

#[test]
fn test_bulk_delete_clears_selection() {
    let tmp = new_board();
    let t1 = add_task(tmp.path(), &["one"]);
    let t2 = add_task(tmp.path(), &["two"]);
    add_task(tmp.path(), &["three"]);

    run_vb_ok(tmp.path(), &["select", &t1, &t2]);
    let sel = run_vb_json(tmp.path(), &["select"]);
    assert_eq!(sel["selected"], serde_json::json!([t1, t2]));

    let out = run_vb_ok(tmp.path(), &["bulk", "rm"]);
    assert!(out.contains("deleted 2 tasks"));

    let sel = run_vb_json(tmp.path(), &["select"]);
    assert_eq!(sel["selected"], serde_json::json!([]));
    let todo = run_vb_json(tmp.path(), &["list", "todo"]);
    assert_eq!(titles(&todo), vec!["three"]);
}

#[test]
fn test_bulk_archive_policy_from_config() {
    let tmp = new_board();
    let open = add_task(tmp.path(), &["open"]);
    let done = add_task(tmp.path(), &["done", "--column", "complete"]);

    run_vb_ok(tmp.path(), &["config", "bulk-archive", "complete"]);
    let config = fs::read_to_string(tmp.path().join(".vibe/board.toml")).unwrap();
    assert!(config.contains("bulk_archive = \"complete\""));

    run_vb_ok(tmp.path(), &["select", &open, &done]);
    let (stdout, stderr, success) = run_vb(tmp.path(), &["bulk", "archive"]);
    assert!(!success);
    assert!(stdout.contains("archived 1 task"));
    assert!(stderr.contains("1 of 2 tasks failed"));
    assert_eq!(column_of(tmp.path(), &done), "archive");
    assert_eq!(column_of(tmp.path(), &open), "todo");

    // Selection is cleared even after a partial failure
    let sel = run_vb_json(tmp.path(), &["select"]);
    assert_eq!(sel["selected"], serde_json::json!([]));

    run_vb_ok(tmp.path(), &["config", "bulk-archive", "any"]);
    run_vb_ok(tmp.path(), &["select", &open]);
    run_vb_ok(tmp.path(), &["bulk", "archive"]);
    assert_eq!(column_of(tmp.path(), &open), "archive");
}

#[test]
fn test_bulk_move() {
    let tmp = new_board();
    let a = add_task(tmp.path(), &["a"]);
    let b = add_task(tmp.path(), &["b"]);
    run_vb_ok(tmp.path(), &["select", &a, &b]);
    let outcome = run_vb_json(tmp.path(), &["bulk", "mv", "in-progress"]);
    assert_eq!(outcome["applied"], serde_json::json!([a, b]));
    assert_eq!(outcome["failures"], serde_json::json!([]));
    assert_eq!(column_of(tmp.path(), &a), "in-progress");
}

#[test]
fn test_bulk_with_empty_selection_fails() {
    let tmp = new_board();
    let (_, stderr, success) = run_vb(tmp.path(), &["bulk", "rm"]);
    assert!(!success);
    assert!(stderr.contains("nothing selected"));
}

#[test]
fn test_single_delete_drops_from_selection() {
    let tmp = new_board();
    let a = add_task(tmp.path(), &["a"]);
    let b = add_task(tmp.path(), &["b"]);
    run_vb_ok(tmp.path(), &["select", &a, &b]);
    run_vb_ok(tmp.path(), &["rm", &a]);
    let sel = run_vb_json(tmp.path(), &["select"]);
    assert_eq!(sel["selected"], serde_json::json!([b]));
}

// ---------------------------------------------------------------------------
// Labels, todos, note
// ---------------------------------------------------------------------------

#[test]
fn test_deleted_label_stays_on_task() {
    let tmp = new_board();
    run_vb_ok(tmp.path(), &["label", "add", "Backend", "--color", "green"]);
    let id = add_task(tmp.path(), &["API", "--label", "backend"]);
    let label_id = run_vb_json(tmp.path(), &["show", &id])["labels"][0]
        .as_str()
        .unwrap()
        .to_string();

    run_vb_ok(tmp.path(), &["label", "rm", "Backend"]);

    let task = run_vb_json(tmp.path(), &["show", &id]);
    assert_eq!(task["labels"], serde_json::json!([label_id]));
    assert_eq!(task["label_names"], serde_json::json!([]));
}

#[test]
fn test_unknown_label_on_add_fails() {
    let tmp = new_board();
    let (_, stderr, success) = run_vb(tmp.path(), &["add", "x", "--label", "nope"]);
    assert!(!success);
    assert!(stderr.contains("label not found: nope"));
}

#[test]
fn test_todo_lifecycle() {
    let tmp = new_board();
    let first = run_vb_json(tmp.path(), &["todo", "add", "milk"]);
    run_vb_ok(tmp.path(), &["todo", "add", "eggs"]);
    let first_id = first["id"].as_str().unwrap();
    run_vb_ok(tmp.path(), &["todo", "done", first_id]);

    let out = run_vb_ok(tmp.path(), &["todo"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[ ]") && lines[0].ends_with("eggs"));
    assert!(lines[1].starts_with("[x]") && lines[1].ends_with("milk"));

    let (_, _, success) = run_vb(tmp.path(), &["todo", "add", "   "]);
    assert!(!success);

    run_vb_ok(tmp.path(), &["todo", "rm", first_id]);
    let todos = run_vb_json(tmp.path(), &["todo"]);
    assert_eq!(todos.as_array().unwrap().len(), 1);
}

#[test]
fn test_note_set_and_show() {
    let tmp = new_board();
    assert_eq!(run_vb_ok(tmp.path(), &["note"]), "");
    run_vb_ok(tmp.path(), &["note", "set", "call the dentist"]);
    assert_eq!(run_vb_ok(tmp.path(), &["note"]).trim(), "call the dentist");
    let note = run_vb_json(tmp.path(), &["note"]);
    assert_eq!(note["content"], "call the dentist");
}

#[test]
fn test_store_file_survives_between_commands() {
    let tmp = new_board();
    add_task(tmp.path(), &["persisted"]);
    let text = fs::read_to_string(tmp.path().join(".vibe/store.json")).unwrap();
    let store: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(store["schema_version"], 1);
    assert_eq!(store["tasks"][0]["title"], "persisted");
    assert_eq!(store["note"]["id"], "default-note");
    // The lock file stays behind, but no command is holding it
    let lock = fs::read_to_string(tmp.path().join(".vibe/.lock")).unwrap();
    assert!(lock.is_empty());
}
