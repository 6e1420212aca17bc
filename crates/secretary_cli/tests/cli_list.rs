use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::{OffsetDateTime, UtcOffset};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("secretary-{nanos}-{file_name}"))
}

fn local_today() -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date().to_string()
}

fn task(id: &str, title: &str, priority: &str, due_date: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "owner_id": "local",
        "title": title,
        "priority": priority,
        "due_date": due_date,
        "completed": completed,
        "created_at": "2024-02-01T00:00:00Z"
    })
}

fn write_store(path: &Path, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 2,
        "tasks": tasks
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn secretary(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_secretary"))
        .args(args)
        .env("SECRETARY_STORE_PATH", store_path)
        .env("SECRETARY_CONFIG_PATH", temp_path("absent-config.json"))
        .output()
        .expect("failed to run secretary")
}

fn ids(output: &Output) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect()
}

fn mixed_store(path: &Path) {
    write_store(
        path,
        serde_json::json!([
            task("pending-late", "Plan offsite", "low", "2999-03-01", false),
            task("expired", "Submit report", "medium", "2020-01-15", false),
            task("completed", "Pay invoice", "high", "2020-01-10", true),
            task("pending-soon", "Team meeting", "high", "2999-01-01", false),
        ]),
    );
}

#[test]
fn list_defaults_to_active_sorted_by_due_date() {
    let store_path = temp_path("cli-list-active.json");
    mixed_store(&store_path);

    let output = secretary(&store_path, &["list", "--json"]);
    let plain = secretary(&store_path, &["list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(ids(&output), ["pending-soon", "pending-late"]);
    let stdout = String::from_utf8_lossy(&plain.stdout);
    assert!(stdout.contains("Team meeting"));
    assert!(!stdout.contains("Submit report"));
    assert!(!stdout.contains("Pay invoice"));
}

#[test]
fn list_expired_and_completed_views() {
    let store_path = temp_path("cli-list-views.json");
    mixed_store(&store_path);

    let expired = secretary(&store_path, &["list", "expired", "--json"]);
    let completed = secretary(&store_path, &["list", "completed", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(ids(&expired), ["expired"]);
    assert_eq!(ids(&completed), ["completed"]);
}

#[test]
fn list_all_sorted_by_priority_is_stable() {
    let store_path = temp_path("cli-list-priority.json");
    mixed_store(&store_path);

    let output = secretary(&store_path, &["list", "all", "--sort", "priority", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(
        ids(&output),
        ["completed", "pending-soon", "expired", "pending-late"]
    );
}

#[test]
fn list_search_and_date_filters_combine() {
    let store_path = temp_path("cli-list-filters.json");
    mixed_store(&store_path);

    let searched = secretary(&store_path, &["list", "all", "--search", "MEETING", "--json"]);
    let dated = secretary(&store_path, &["list", "all", "--date", "2020-01-15", "--json"]);
    let none = secretary(
        &store_path,
        &["list", "all", "--search", "meeting", "--date", "2020-01-15", "--json"],
    );
    std::fs::remove_file(&store_path).ok();

    assert_eq!(ids(&searched), ["pending-soon"]);
    assert_eq!(ids(&dated), ["expired"]);
    assert!(ids(&none).is_empty());
}

#[test]
fn list_rejects_unreadable_filter_date() {
    let store_path = temp_path("cli-list-bad-date.json");
    mixed_store(&store_path);

    let output = secretary(&store_path, &["list", "--date", "someday"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_date - "));
}

#[test]
fn list_warns_about_unreadable_due_dates_and_keeps_going() {
    let store_path = temp_path("cli-list-issues.json");
    write_store(
        &store_path,
        serde_json::json!([
            task("good", "Plan offsite", "low", "2999-03-01", false),
            task("bad", "Broken", "low", "soon", false),
        ]),
    );

    let output = secretary(&store_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(ids(&output), ["good"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARNING: invalid_date - task bad"));
}

#[test]
fn empty_store_lists_nothing() {
    let store_path = temp_path("cli-list-empty.json");

    let output = secretary(&store_path, &["list"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No tasks"));
}

#[test]
fn today_lists_pending_tasks_due_today() {
    let store_path = temp_path("cli-today.json");
    let today = local_today();
    write_store(
        &store_path,
        serde_json::json!([
            task("today", "Call bank", "high", &today, false),
            task("today-done", "Water plants", "low", &today, true),
            task("later", "Plan offsite", "low", "2999-03-01", false),
        ]),
    );

    let output = secretary(&store_path, &["today", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(ids(&output), ["today"]);
}

#[test]
fn history_splits_completed_and_expired() {
    let store_path = temp_path("cli-history.json");
    mixed_store(&store_path);

    let json = secretary(&store_path, &["history", "--json"]);
    let plain = secretary(&store_path, &["history"]);
    std::fs::remove_file(&store_path).ok();

    let value: serde_json::Value = serde_json::from_slice(&json.stdout).unwrap();
    assert_eq!(value["completed"][0]["id"], "completed");
    assert_eq!(value["expired"][0]["id"], "expired");
    assert_eq!(value["expired"][0]["status"], "expired");

    let stdout = String::from_utf8_lossy(&plain.stdout);
    assert!(stdout.contains("Pay invoice"));
    assert!(stdout.contains("Submit report"));
    assert!(!stdout.contains("Team meeting"));
}
