use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("secretary-{nanos}-{file_name}"))
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

fn seed(path: &Path) {
    write_store(
        path,
        serde_json::json!([
            {
                "id": "task-1",
                "owner_id": "local",
                "title": "Team Meeting",
                "priority": "high",
                "due_date": "2024-02-14",
                "completed": true,
                "created_at": "2024-02-01T00:00:00Z"
            },
            {
                "id": "task-2",
                "owner_id": "local",
                "title": "Submit report",
                "priority": "high",
                "due_date": "2024-02-20T09:30:00Z",
                "created_at": "2024-02-01T00:00:00Z"
            },
            {
                "id": "task-3",
                "owner_id": "local",
                "title": "Plan offsite",
                "priority": "low",
                "due_date": "2999-03-01",
                "created_at": "2024-02-01T00:00:00Z"
            },
            {
                "id": "task-4",
                "owner_id": "bob",
                "title": "Not mine",
                "priority": "medium",
                "due_date": "2024-02-14",
                "created_at": "2024-02-01T00:00:00Z"
            }
        ]),
    );
}

#[test]
fn stats_json_counts_owner_tasks() {
    let store_path = temp_path("cli-stats.json");
    seed(&store_path);

    let output = secretary(&store_path, &["stats", "--months", "3", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_count"], 3);
    assert_eq!(stats["completed_count"], 1);
    assert_eq!(stats["expired_count"], 1);
    assert_eq!(stats["pending_count"], 1);
    assert_eq!(stats["priority_counts"]["high"], 2);
    assert_eq!(stats["priority_counts"]["medium"], 0);
    assert_eq!(stats["months"].as_array().map(Vec::len), Some(3));
    let rate = stats["completion_rate"].as_f64().unwrap();
    assert!((rate - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn stats_plain_text_on_empty_store() {
    let store_path = temp_path("cli-stats-empty.json");

    let output = secretary(&store_path, &["stats", "--months", "0"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 of 0 tasks completed (0%)"));
}

#[test]
fn stats_months_beyond_the_cap_are_clamped() {
    let store_path = temp_path("cli-stats-huge.json");
    seed(&store_path);

    let output = secretary(&store_path, &["stats", "--months", "4294967295", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["months"].as_array().map(Vec::len), Some(120));
}

#[test]
fn calendar_month_lists_holidays_and_tasks() {
    let store_path = temp_path("cli-calendar.json");
    seed(&store_path);

    let json = secretary(&store_path, &["calendar", "--month", "2024-02", "--json"]);
    let plain = secretary(&store_path, &["calendar", "--month", "2024-02"]);
    std::fs::remove_file(&store_path).ok();

    assert!(json.status.success());
    let days: serde_json::Value = serde_json::from_slice(&json.stdout).unwrap();
    assert_eq!(days.as_array().map(Vec::len), Some(29));
    let valentines = &days[13];
    assert_eq!(valentines["date"], "2024-02-14");
    assert_eq!(valentines["events"][0]["kind"], "holiday");
    assert_eq!(valentines["events"][1]["id"], "task-1");
    assert_eq!(valentines["events"][1]["abbreviation"], "TM");
    assert_eq!(valentines["events"].as_array().map(Vec::len), Some(2));
    assert_eq!(days[19]["events"][0]["kind"], "meeting");
    assert_eq!(days[19]["events"][0]["id"], "meeting-1-2024");

    let stdout = String::from_utf8_lossy(&plain.stdout);
    assert!(stdout.contains("February 2024"));
    assert!(stdout.contains("2024-02-19 [holiday] Presidents' Day (PD)"));
    assert!(stdout.contains("2024-02-20 [meeting] Team Meeting (TM)"));
    assert!(stdout.contains("[task] Submit report (SR)"));
    assert!(!stdout.contains("Not mine"));
}

#[test]
fn calendar_rejects_malformed_month() {
    let store_path = temp_path("cli-calendar-bad.json");

    let output = secretary(&store_path, &["calendar", "--month", "2024-13"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - month must be YYYY-MM"));
}
