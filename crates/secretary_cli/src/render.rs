use secretary_core::config::Palette;
use secretary_core::engine::{self, CalendarDay, MonthBucket, Stats};
use secretary_core::model::{Note, Task};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::{Month, OffsetDateTime};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct NoteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Note")]
    content: String,
    #[tabled(rename = "Updated")]
    updated_at: String,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Completed")]
    completed: usize,
    #[tabled(rename = "Expired")]
    expired: usize,
    #[tabled(rename = "Pending")]
    pending: usize,
}

/// Status as of `now`, or `invalid date` when the due date cannot be read.
pub fn status_label(task: &Task, now: OffsetDateTime) -> &'static str {
    engine::classify(task, now)
        .map(|status| status.label())
        .unwrap_or("invalid date")
}

pub fn task_table(tasks: &[Task], now: OffsetDateTime) -> String {
    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority.to_string(),
        due: task.due_date.clone(),
        status: status_label(task, now).to_string(),
    });
    Table::new(rows).with(Style::sharp()).to_string()
}

pub fn note_table(notes: &[Note]) -> String {
    let rows = notes.iter().map(|note| NoteRow {
        id: note.id.clone(),
        content: note.content.clone(),
        updated_at: note.updated_at.clone(),
    });
    Table::new(rows).with(Style::sharp()).to_string()
}

pub fn task_detail(task: &Task, now: OffsetDateTime, palette: &Palette) -> String {
    let mut lines = vec![
        palette.accentize(&task.title),
        format!("ID: {}", task.id),
        format!("Priority: {}", task.priority),
        format!("Due: {}", task.due_date),
        format!("Status: {}", status_label(task, now)),
    ];
    if let Ok(days) = engine::days_until_due(task, now) {
        lines.push(palette.mutedize(&format!("Days until due: {days}")));
    }
    if let Some(description) = task.description.as_deref() {
        lines.push(format!("Description: {description}"));
    }
    if let Some(location) = task.location {
        lines.push(format!("Location: {}, {}", location.lat, location.lng));
    }
    lines.push(palette.mutedize(&format!("Created: {}", task.created_at)));
    lines.join("\n")
}

pub fn task_json(task: &Task, now: OffsetDateTime) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "owner_id": task.owner_id,
        "title": task.title,
        "description": task.description,
        "priority": task.priority,
        "due_date": task.due_date,
        "location": task.location,
        "completed": task.completed,
        "status": status_label(task, now),
        "created_at": task.created_at,
    })
}

pub fn tasks_json(tasks: &[Task], now: OffsetDateTime) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(|task| task_json(task, now)).collect())
}

pub fn note_json(note: &Note) -> serde_json::Value {
    serde_json::json!({
        "id": note.id,
        "owner_id": note.owner_id,
        "content": note.content,
        "created_at": note.created_at,
        "updated_at": note.updated_at,
    })
}

pub fn stats_text(stats: &Stats, buckets: &[MonthBucket], palette: &Palette) -> String {
    let percent = (stats.completion_rate * 100.0).round();
    let counts = &stats.priority_counts;
    let mut out = vec![
        palette.accentize("Task completion"),
        format!(
            "{} of {} tasks completed ({percent}%)",
            stats.completed_count, stats.total_count
        ),
        format!(
            "Pending {} | Expired {}",
            stats.pending_count, stats.expired_count
        ),
        format!(
            "Priority: high {} | medium {} | low {}",
            counts.high, counts.medium, counts.low
        ),
    ];

    if !buckets.is_empty() {
        let rows = buckets.iter().map(|bucket| MonthRow {
            month: month_label(bucket.year, bucket.month),
            completed: bucket.completed,
            expired: bucket.expired,
            pending: bucket.pending,
        });
        out.push(Table::new(rows).with(Style::sharp()).to_string());
    }
    out.join("\n")
}

pub fn stats_json(stats: &Stats, buckets: &[MonthBucket]) -> serde_json::Value {
    let months: Vec<serde_json::Value> = buckets
        .iter()
        .map(|bucket| {
            serde_json::json!({
                "year": bucket.year,
                "month": u8::from(bucket.month),
                "completed": bucket.completed,
                "expired": bucket.expired,
                "pending": bucket.pending,
            })
        })
        .collect();

    serde_json::json!({
        "total_count": stats.total_count,
        "completed_count": stats.completed_count,
        "pending_count": stats.pending_count,
        "expired_count": stats.expired_count,
        "completion_rate": stats.completion_rate,
        "priority_counts": stats.priority_counts,
        "months": months,
    })
}

/// Only days with events are listed.
pub fn calendar_text(year: i32, month: Month, days: &[CalendarDay], palette: &Palette) -> String {
    let mut out = vec![palette.accentize(&month_label(year, month))];
    for day in days.iter().filter(|day| !day.events.is_empty()) {
        for event in &day.events {
            out.push(format!(
                "{} [{}] {} ({})",
                day.date,
                event.kind.label(),
                event.title,
                engine::abbreviation(&event.title)
            ));
        }
    }
    if out.len() == 1 {
        out.push(palette.mutedize("No events"));
    }
    out.join("\n")
}

pub fn calendar_json(days: &[CalendarDay]) -> serde_json::Value {
    let days: Vec<serde_json::Value> = days
        .iter()
        .map(|day| {
            let events: Vec<serde_json::Value> = day
                .events
                .iter()
                .map(|event| {
                    serde_json::json!({
                        "id": event.id,
                        "title": event.title,
                        "kind": event.kind.label(),
                        "abbreviation": engine::abbreviation(&event.title),
                    })
                })
                .collect();
            serde_json::json!({ "date": day.date.to_string(), "events": events })
        })
        .collect();
    serde_json::Value::Array(days)
}

fn month_label(year: i32, month: Month) -> String {
    format!("{month} {year}")
}
