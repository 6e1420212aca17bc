use crate::error::{AppError, DateIssue};
use crate::model::{DueDate, Task, TaskStatus};
use time::OffsetDateTime;

/// Completed wins over any due date; otherwise a strictly past due date
/// means expired.
pub fn classify(task: &Task, now: OffsetDateTime) -> Result<TaskStatus, AppError> {
    if task.completed {
        return Ok(TaskStatus::Completed);
    }

    let due = parse_due(task, now)?;
    if due.is_past(now) {
        Ok(TaskStatus::ExpiredUncompleted)
    } else {
        Ok(TaskStatus::Pending)
    }
}

pub fn is_expired(task: &Task, now: OffsetDateTime) -> Result<bool, AppError> {
    Ok(classify(task, now)? == TaskStatus::ExpiredUncompleted)
}

pub(crate) fn parse_due(task: &Task, now: OffsetDateTime) -> Result<DueDate, AppError> {
    DueDate::parse(&task.due_date, now.offset()).map_err(|err| {
        AppError::invalid_date(format!("task {}: {}", task.id, err.message()))
    })
}

pub(crate) fn issue(task: &Task, error: AppError) -> DateIssue {
    tracing::warn!(task_id = %task.id, due_date = %task.due_date, "skipping task with unreadable due date");
    DateIssue {
        task_id: task.id.clone(),
        error,
    }
}
