use crate::engine::{self, NotifiedPolicy};
use crate::error::{AppError, DateIssue};
use crate::model::{DueDate, Note, Task, TaskFields};
use crate::notify::Notifier;
use crate::storage::json_store;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// The task collection as an external collaborator. The engine only ever sees
/// the snapshots returned by `list_tasks`.
pub trait TaskStore {
    fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, AppError>;
    fn create_task(&self, owner_id: &str, fields: TaskFields) -> Result<Task, AppError>;
    fn update_task(&self, id: &str, fields: TaskFields) -> Result<Task, AppError>;
    fn toggle_completed(&self, id: &str) -> Result<Task, AppError>;
    fn delete_task(&self, id: &str) -> Result<(), AppError>;
}

pub trait NoteStore {
    /// Newest first.
    fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, AppError>;
    fn create_note(&self, owner_id: &str, content: &str) -> Result<Note, AppError>;
    fn update_note(&self, id: &str, content: &str) -> Result<Note, AppError>;
    fn delete_note(&self, id: &str) -> Result<(), AppError>;
}

#[derive(Debug)]
pub struct NotificationOutcome {
    pub tasks: Vec<Task>,
    pub failures: Vec<NotificationFailure>,
    pub issues: Vec<DateIssue>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: String,
    pub error: AppError,
}

/// Single-file JSON store holding tasks, notes and the notified-task ledger.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open() -> Result<Self, AppError> {
        Ok(Self::new(json_store::store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_task(&self, id: &str) -> Result<Task, AppError> {
        let trimmed_id = required_id(id)?;
        json_store::load_state(&self.path)?
            .tasks
            .into_iter()
            .find(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("task {trimmed_id} not found")))
    }

    pub fn load_notified(&self) -> Result<BTreeSet<String>, AppError> {
        Ok(json_store::load_state(&self.path)?.notified_task_ids)
    }

    pub fn save_notified(&self, ids: &BTreeSet<String>) -> Result<(), AppError> {
        let mut state = json_store::load_state(&self.path)?;
        state.notified_task_ids = ids.clone();
        json_store::save_state(&self.path, &state)
    }

    fn update_task_where<F>(&self, id: &str, apply: F) -> Result<Task, AppError>
    where
        F: FnOnce(&mut Task) -> Result<(), AppError>,
    {
        let trimmed_id = required_id(id)?;
        let mut state = json_store::load_state(&self.path)?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("task {trimmed_id} not found")))?;

        apply(task)?;
        refresh_expired(task, local_now());
        let updated = task.clone();
        json_store::save_state(&self.path, &state)?;

        Ok(updated)
    }

    fn update_note_where<F>(&self, id: &str, apply: F) -> Result<Note, AppError>
    where
        F: FnOnce(&mut Note) -> Result<(), AppError>,
    {
        let trimmed_id = required_id(id)?;
        let mut state = json_store::load_state(&self.path)?;
        let note = state
            .notes
            .iter_mut()
            .find(|note| note.id == trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("note {trimmed_id} not found")))?;

        apply(note)?;
        let updated = note.clone();
        json_store::save_state(&self.path, &state)?;

        Ok(updated)
    }
}

impl TaskStore for JsonStore {
    fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, AppError> {
        let owner_id = required_owner(owner_id)?;
        Ok(json_store::load_state(&self.path)?
            .tasks
            .into_iter()
            .filter(|task| task.owner_id == owner_id)
            .collect())
    }

    fn create_task(&self, owner_id: &str, fields: TaskFields) -> Result<Task, AppError> {
        let owner_id = required_owner(owner_id)?;
        let now = local_now();
        let fields = validate_fields(fields, now.offset())?;

        let mut task = Task {
            id: format!("task-{}", now.unix_timestamp_nanos()),
            owner_id: owner_id.to_string(),
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            due_date: fields.due_date,
            location: fields.location,
            completed: false,
            expired: false,
            created_at: timestamp(now)?,
        };
        refresh_expired(&mut task, now);

        let mut state = json_store::load_state(&self.path)?;
        state.tasks.push(task.clone());
        json_store::save_state(&self.path, &state)?;

        tracing::info!(task_id = %task.id, owner_id, "created task");
        Ok(task)
    }

    fn update_task(&self, id: &str, fields: TaskFields) -> Result<Task, AppError> {
        let fields = validate_fields(fields, local_now().offset())?;
        self.update_task_where(id, |task| {
            task.title = fields.title;
            task.description = fields.description;
            task.priority = fields.priority;
            task.due_date = fields.due_date;
            task.location = fields.location;
            Ok(())
        })
    }

    fn toggle_completed(&self, id: &str) -> Result<Task, AppError> {
        self.update_task_where(id, |task| {
            task.completed = !task.completed;
            Ok(())
        })
    }

    fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let trimmed_id = required_id(id)?;
        let mut state = json_store::load_state(&self.path)?;
        let index = state
            .tasks
            .iter()
            .position(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("task {trimmed_id} not found")))?;

        state.tasks.remove(index);
        state.notified_task_ids.remove(trimmed_id);
        json_store::save_state(&self.path, &state)?;

        tracing::info!(task_id = trimmed_id, "deleted task");
        Ok(())
    }
}

impl NoteStore for JsonStore {
    fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, AppError> {
        let owner_id = required_owner(owner_id)?;
        Ok(json_store::load_state(&self.path)?
            .notes
            .into_iter()
            .rev()
            .filter(|note| note.owner_id == owner_id)
            .collect())
    }

    fn create_note(&self, owner_id: &str, content: &str) -> Result<Note, AppError> {
        let owner_id = required_owner(owner_id)?;
        let content = required_content(content)?;
        let now = local_now();
        let stamp = timestamp(now)?;

        let note = Note {
            id: format!("note-{}", now.unix_timestamp_nanos()),
            owner_id: owner_id.to_string(),
            content: content.to_string(),
            created_at: stamp.clone(),
            updated_at: stamp,
        };

        let mut state = json_store::load_state(&self.path)?;
        state.notes.push(note.clone());
        json_store::save_state(&self.path, &state)?;

        Ok(note)
    }

    fn update_note(&self, id: &str, content: &str) -> Result<Note, AppError> {
        let content = required_content(content)?.to_string();
        let updated_at = timestamp(local_now())?;
        self.update_note_where(id, |note| {
            note.content = content;
            note.updated_at = updated_at;
            Ok(())
        })
    }

    fn delete_note(&self, id: &str) -> Result<(), AppError> {
        let trimmed_id = required_id(id)?;
        let mut state = json_store::load_state(&self.path)?;
        let index = state
            .notes
            .iter()
            .position(|note| note.id == trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("note {trimmed_id} not found")))?;

        state.notes.remove(index);
        json_store::save_state(&self.path, &state)
    }
}

/// Detects newly due-soon tasks, shows them, and records the ones that were
/// actually delivered so the next run skips them.
pub fn notify_due_soon(
    store: &JsonStore,
    notifier: &dyn Notifier,
    owner_id: &str,
    now: OffsetDateTime,
    horizon_days: u32,
    policy: NotifiedPolicy,
) -> Result<NotificationOutcome, AppError> {
    let tasks = store.list_tasks(owner_id)?;
    let state = json_store::load_state(store.path())?;
    let (own, foreign): (BTreeSet<String>, BTreeSet<String>) = state
        .notified_task_ids
        .into_iter()
        .partition(|id| tasks.iter().any(|task| &task.id == id));

    let report = engine::detect_due_soon(&tasks, now, horizon_days, &own, policy);
    let mut notified = Vec::new();
    let mut failures = Vec::new();

    for task in report.to_notify {
        match notifier.notify(&task) {
            Ok(()) => notified.push(task),
            Err(error) => {
                tracing::warn!(task_id = %task.id, %error, "notification failed");
                failures.push(NotificationFailure {
                    task_id: task.id,
                    error,
                });
            }
        }
    }

    let mut ledger = report.notified;
    for failure in &failures {
        ledger.remove(&failure.task_id);
    }
    // Other owners' entries are outside this snapshot and stay untouched.
    ledger.extend(foreign);
    store.save_notified(&ledger)?;

    Ok(NotificationOutcome {
        tasks: notified,
        failures,
        issues: report.issues,
    })
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

fn refresh_expired(task: &mut Task, now: OffsetDateTime) {
    task.expired = engine::is_expired(task, now).unwrap_or(false);
}

fn timestamp(at: OffsetDateTime) -> Result<String, AppError> {
    at.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn validate_fields(fields: TaskFields, offset: UtcOffset) -> Result<TaskFields, AppError> {
    let title = fields.title.trim();
    if title.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }

    let description = fields
        .description
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let due_date = DueDate::parse(&fields.due_date, offset)?.to_canonical()?;

    Ok(TaskFields {
        title: title.to_string(),
        description,
        priority: fields.priority,
        due_date,
        location: fields.location,
    })
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn required_owner(owner_id: &str) -> Result<&str, AppError> {
    let trimmed = owner_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("owner is required"));
    }
    Ok(trimmed)
}

fn required_content(content: &str) -> Result<&str, AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("note content is required"));
    }
    Ok(trimmed)
}
