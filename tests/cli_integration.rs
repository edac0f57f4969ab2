//! CLI integration tests for minipm
//!
//! These tests drive the binary end to end: project setup, task
//! management, and scheduling with persisted order.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the minipm binary, isolated from the user's global config
fn minipm_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("minipm"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg-config"))
        .env("HOME", dir);
    cmd
}

/// Create a temporary directory and initialize a project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    minipm_in(dir.path()).arg("init").assert().success();
    dir
}

fn add_task(dir: &Path, args: &[&str]) {
    minipm_in(dir)
        .args(["task", "add"])
        .args(args)
        .assert()
        .success();
}

fn json_stdout(assert: &assert_cmd::assert::Assert) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    serde_json::from_str(stdout.trim()).unwrap()
}

fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn listed_titles(dir: &Path) -> Vec<String> {
    let assert = minipm_in(dir)
        .args(["task", "list", "--format", "json"])
        .assert()
        .success();
    json_stdout(&assert)
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

fn write_input(dir: &Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("tasks.json");
    fs::write(&path, json).unwrap();
    path
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    minipm_in(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized minipm project"));

    assert!(dir.path().join(".minipm").is_dir());
    assert!(dir.path().join(".minipm/config.toml").is_file());
    assert!(dir.path().join(".minipm/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = setup_project();
    minipm_in(dir.path()).arg("init").assert().success();
}

#[test]
fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();

    minipm_in(dir.path())
        .args(["task", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not in a minipm project"));
}

// =============================================================================
// Task Tests
// =============================================================================

#[test]
fn test_task_add_and_list() {
    let dir = setup_project();

    minipm_in(dir.path())
        .args(["task", "add", "Write docs", "--due", "2024-01-05", "--hours", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task t-"));

    minipm_in(dir.path())
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Write docs"))
        .stdout(predicate::str::contains("2024-01-05"));
}

#[test]
fn test_task_add_json_returns_id() {
    let dir = setup_project();

    let assert = minipm_in(dir.path())
        .args(["task", "add", "Design", "--format", "json"])
        .assert()
        .success();
    let json = json_stdout(&assert);

    assert!(json["id"].as_str().unwrap().starts_with("t-"));
    assert_eq!(json["title"], "Design");
}

#[test]
fn test_task_add_rejects_duplicate_title() {
    let dir = setup_project();
    add_task(dir.path(), &["Deploy"]);

    minipm_in(dir.path())
        .args(["task", "add", "  DEPLOY "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_task_add_rejects_unknown_after() {
    let dir = setup_project();

    minipm_in(dir.path())
        .args(["task", "add", "Ship", "--after", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found: Ghost"));
}

#[test]
fn test_task_add_rejects_bad_due_date() {
    let dir = setup_project();

    minipm_in(dir.path())
        .args(["task", "add", "Ship", "--due", "tomorrow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid due date"));
}

#[test]
fn test_task_show_by_title() {
    let dir = setup_project();
    add_task(dir.path(), &["Design"]);
    add_task(dir.path(), &["Build", "--after", "design"]);

    minipm_in(dir.path())
        .args(["task", "show", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build"))
        .stdout(predicate::str::contains("Design"));
}

#[test]
fn test_task_dep_rejects_cycle() {
    let dir = setup_project();
    add_task(dir.path(), &["Alpha"]);
    add_task(dir.path(), &["Bravo", "--after", "Alpha"]);

    minipm_in(dir.path())
        .args(["task", "dep", "Alpha", "Bravo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));
}

#[test]
fn test_task_dep_rejects_self_dependency() {
    let dir = setup_project();
    add_task(dir.path(), &["Alpha"]);

    minipm_in(dir.path())
        .args(["task", "dep", "Alpha", "alpha"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));
}

#[test]
fn test_task_dep_reports_unschedulable_store() {
    let dir = setup_project();
    add_task(dir.path(), &["Design"]);
    add_task(dir.path(), &["Build"]);
    add_task(dir.path(), &["Ship"]);

    // Point Ship at a task that no longer exists
    let store = dir.path().join(".minipm/tasks.jsonl");
    let rewritten: Vec<String> = fs::read_to_string(&store)
        .unwrap()
        .lines()
        .map(|line| {
            let mut task: serde_json::Value = serde_json::from_str(line).unwrap();
            if task["title"] == "Ship" {
                task["depends_on"] = serde_json::json!(["t-0000000"]);
            }
            task.to_string()
        })
        .collect();
    fs::write(&store, rewritten.join("\n") + "\n").unwrap();

    minipm_in(dir.path())
        .args(["task", "dep", "Build", "Design"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be scheduled"))
        .stderr(predicate::str::contains("Unknown dependency 't-0000000'"));
}

#[test]
fn test_task_rm_drops_dependency() {
    let dir = setup_project();
    add_task(dir.path(), &["Alpha"]);
    add_task(dir.path(), &["Bravo", "--after", "Alpha"]);

    minipm_in(dir.path()).args(["task", "rm", "Alpha"]).assert().success();

    let assert = minipm_in(dir.path())
        .args(["task", "show", "Bravo", "--format", "json"])
        .assert()
        .success();
    let json = json_stdout(&assert);
    assert!(json.get("depends_on").is_none());
}

#[test]
fn test_task_add_rejects_short_title() {
    let dir = setup_project();

    minipm_in(dir.path())
        .args(["task", "add", "Go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("3 to 100 characters"));
}

#[test]
fn test_task_set_renames_and_keeps_dependencies() {
    let dir = setup_project();
    add_task(dir.path(), &["Release"]);
    add_task(dir.path(), &["Build", "--due", "2024-01-02"]);
    add_task(dir.path(), &["Release notes", "--due", "2024-01-01", "--after", "Build"]);
    minipm_in(dir.path())
        .args(["task", "dep", "Release", "Release notes"])
        .assert()
        .success();

    minipm_in(dir.path())
        .args(["task", "set", "Build", "--title", "Compile"])
        .assert()
        .success();

    let assert = minipm_in(dir.path())
        .args(["task", "show", "Release notes", "--format", "json"])
        .assert()
        .success();
    let compile_id = json_stdout(&assert)["depends_on"][0].clone();
    let assert = minipm_in(dir.path())
        .args(["task", "show", "compile", "--format", "json"])
        .assert()
        .success();
    assert_eq!(json_stdout(&assert)["id"], compile_id);

    let assert = minipm_in(dir.path())
        .args(["schedule", "--format", "json"])
        .assert()
        .success();
    assert_eq!(
        string_list(&json_stdout(&assert)["order"]),
        vec!["Compile", "Release notes", "Release"]
    );
}

#[test]
fn test_task_set_rejects_taken_title() {
    let dir = setup_project();
    add_task(dir.path(), &["Design"]);
    add_task(dir.path(), &["Build"]);

    minipm_in(dir.path())
        .args(["task", "set", "Build", "--title", " DESIGN "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(listed_titles(dir.path()), vec!["Design", "Build"]);
}

#[test]
fn test_task_set_may_change_case_of_own_title() {
    let dir = setup_project();
    add_task(dir.path(), &["design"]);

    minipm_in(dir.path())
        .args(["task", "set", "design", "--title", "Design"])
        .assert()
        .success();

    assert_eq!(listed_titles(dir.path()), vec!["Design"]);
}

// =============================================================================
// Schedule Tests
// =============================================================================

#[test]
fn test_schedule_empty_project() {
    let dir = setup_project();

    minipm_in(dir.path())
        .arg("schedule")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks to schedule"));
}

#[test]
fn test_schedule_orders_and_persists() {
    let dir = setup_project();
    add_task(dir.path(), &["Write tests"]);
    add_task(dir.path(), &["Build", "--due", "2024-01-02"]);
    add_task(dir.path(), &["Design", "--due", "2024-01-01"]);
    add_task(dir.path(), &["Deploy", "--after", "Build", "--after", "Write tests"]);

    let assert = minipm_in(dir.path())
        .args(["schedule", "--format", "json"])
        .assert()
        .success();
    let json = json_stdout(&assert);

    assert_eq!(
        string_list(&json["order"]),
        vec!["Design", "Build", "Write tests", "Deploy"]
    );
    assert_eq!(json["persisted"], true);
    assert_eq!(json["ids"].as_array().unwrap().len(), 4);

    assert_eq!(
        listed_titles(dir.path()),
        vec!["Design", "Build", "Write tests", "Deploy"]
    );
}

#[test]
fn test_schedule_is_stable_across_runs() {
    let dir = setup_project();
    add_task(dir.path(), &["Alpha"]);
    add_task(dir.path(), &["Charlie", "--after", "Alpha"]);
    add_task(dir.path(), &["Bravo", "--after", "Alpha"]);

    let first = minipm_in(dir.path())
        .args(["schedule", "--format", "json"])
        .assert()
        .success();
    let second = minipm_in(dir.path())
        .args(["schedule", "--format", "json"])
        .assert()
        .success();

    let first = json_stdout(&first);
    let second = json_stdout(&second);
    assert_eq!(first["order"], second["order"]);
    assert_eq!(string_list(&first["order"]), vec!["Alpha", "Charlie", "Bravo"]);
    assert_eq!(second["changed"], 0);
}

#[test]
fn test_schedule_dry_run_does_not_persist() {
    let dir = setup_project();
    add_task(dir.path(), &["Later", "--due", "2024-02-01"]);
    add_task(dir.path(), &["Sooner", "--due", "2024-01-01"]);

    minipm_in(dir.path())
        .args(["schedule", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order not saved"));

    assert_eq!(listed_titles(dir.path()), vec!["Later", "Sooner"]);
}

#[test]
fn test_schedule_respects_persist_order_config() {
    let dir = setup_project();
    fs::write(
        dir.path().join(".minipm/config.toml"),
        "[schedule]\npersist_order = false\n",
    )
    .unwrap();
    add_task(dir.path(), &["Later", "--due", "2024-02-01"]);
    add_task(dir.path(), &["Sooner", "--due", "2024-01-01"]);

    let assert = minipm_in(dir.path())
        .args(["schedule", "--format", "json"])
        .assert()
        .success();
    assert_eq!(json_stdout(&assert)["persisted"], false);

    assert_eq!(listed_titles(dir.path()), vec!["Later", "Sooner"]);
}

#[test]
fn test_schedule_skips_completed_when_configured() {
    let dir = setup_project();
    fs::write(
        dir.path().join(".minipm/config.toml"),
        "[schedule]\ninclude_completed = false\n",
    )
    .unwrap();
    add_task(dir.path(), &["Design"]);
    add_task(dir.path(), &["Build", "--after", "Design"]);
    minipm_in(dir.path())
        .args(["task", "done", "Design"])
        .assert()
        .success();

    let assert = minipm_in(dir.path())
        .args(["schedule", "--format", "json", "--dry-run"])
        .assert()
        .success();
    assert_eq!(string_list(&json_stdout(&assert)["order"]), vec!["Build"]);
}

#[test]
fn test_schedule_from_input_file() {
    let dir = setup_project();
    let input = write_input(
        dir.path(),
        r#"{"tasks": [
            {"title": "A", "dependencies": []},
            {"title": "B", "dependencies": ["A"]},
            {"title": "C", "dependencies": ["a"]}
        ]}"#,
    );

    let assert = minipm_in(dir.path())
        .args(["schedule", "--format", "json", "--input"])
        .arg(&input)
        .assert()
        .success();
    let json = json_stdout(&assert);

    assert_eq!(string_list(&json["order"]), vec!["A", "B", "C"]);
    // None of these titles are stored
    assert!(json["ids"].as_array().unwrap().iter().all(|v| v.is_null()));
}

#[test]
fn test_schedule_input_file_updates_matching_tasks() {
    let dir = setup_project();
    add_task(dir.path(), &["Review"]);
    add_task(dir.path(), &["Release"]);

    let input = write_input(
        dir.path(),
        r#"[
            {"title": "Extra", "dueDate": "2024-01-01"},
            {"title": "release", "dueDate": "2024-01-02"},
            {"title": "Review", "dueDate": "2024-01-03"}
        ]"#,
    );

    minipm_in(dir.path())
        .args(["schedule", "--input"])
        .arg(&input)
        .assert()
        .success();

    assert_eq!(listed_titles(dir.path()), vec!["Release", "Review"]);
}

#[test]
fn test_schedule_cycle_exits_with_data_error() {
    let dir = setup_project();
    let input = write_input(
        dir.path(),
        r#"[{"title": "A", "dependencies": ["B"]}, {"title": "B", "dependencies": ["A"]}]"#,
    );

    minipm_in(dir.path())
        .args(["schedule", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Cyclic or unresolved dependencies"));
}

#[test]
fn test_schedule_unknown_dependency_names_both() {
    let dir = setup_project();
    let input = write_input(dir.path(), r#"[{"title": "A", "dependencies": ["Ghost"]}]"#);

    minipm_in(dir.path())
        .args(["schedule", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(
            "Unknown dependency 'Ghost' for task 'A'",
        ));
}

#[test]
fn test_schedule_json_failure_carries_code() {
    let dir = setup_project();
    let input = write_input(dir.path(), r#"[{"title": "A"}, {"title": "a"}]"#);

    let assert = minipm_in(dir.path())
        .args(["schedule", "--format", "json", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(2);
    let json = json_stdout(&assert);

    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "duplicate_title");
}

#[test]
fn test_schedule_failure_leaves_store_untouched() {
    let dir = setup_project();
    add_task(dir.path(), &["Alpha"]);
    add_task(dir.path(), &["Bravo"]);
    let store = dir.path().join(".minipm/tasks.jsonl");
    let before = fs::read_to_string(&store).unwrap();

    let input = write_input(
        dir.path(),
        r#"[{"title": "Bravo"}, {"title": "Alpha", "dependencies": ["Alpha"]}]"#,
    );
    minipm_in(dir.path())
        .args(["schedule", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(2);

    assert_eq!(fs::read_to_string(&store).unwrap(), before);
}

#[test]
fn test_schedule_malformed_input_is_general_error() {
    let dir = setup_project();
    let input = write_input(dir.path(), r#"[{"title": "A", "estimatedHours": -2}]"#);

    minipm_in(dir.path())
        .args(["schedule", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse schedule input"));
}

#[test]
fn test_schedule_misspelled_wrapper_is_rejected() {
    let dir = setup_project();
    add_task(dir.path(), &["Later", "--due", "2024-02-01"]);
    add_task(dir.path(), &["Sooner", "--due", "2024-01-01"]);
    let input = write_input(dir.path(), r#"{"taks": [{"title": "Sooner"}]}"#);

    minipm_in(dir.path())
        .args(["schedule", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse schedule input"));

    assert_eq!(listed_titles(dir.path()), vec!["Later", "Sooner"]);
}

#[test]
fn test_schedule_by_deadline_ignores_dependencies() {
    let dir = setup_project();
    add_task(dir.path(), &["Prep"]);
    add_task(dir.path(), &["Launch", "--due", "2024-01-01", "--after", "Prep"]);

    let assert = minipm_in(dir.path())
        .args(["schedule", "--by-deadline", "--format", "json"])
        .assert()
        .success();

    assert_eq!(
        string_list(&json_stdout(&assert)["order"]),
        vec!["Launch", "Prep"]
    );
    assert_eq!(listed_titles(dir.path()), vec!["Launch", "Prep"]);
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = setup_project();

    minipm_in(dir.path())
        .args(["--verbose", "schedule"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:schedule]"));
}
