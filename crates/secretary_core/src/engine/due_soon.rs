use super::classify::{classify, issue, parse_due};
use crate::error::{AppError, DateIssue};
use crate::model::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use time::OffsetDateTime;

/// What happens to a notified id once its task stops qualifying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifiedPolicy {
    /// Never notify the same task twice.
    Keep,
    /// Forget tasks that no longer qualify so a rescheduled task notifies again.
    #[default]
    ResetWhenNotDue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueSoonReport {
    pub to_notify: Vec<Task>,
    pub notified: BTreeSet<String>,
    pub issues: Vec<DateIssue>,
}

/// Whole calendar days until the task is due, negative when overdue.
pub fn days_until_due(task: &Task, now: OffsetDateTime) -> Result<i64, AppError> {
    Ok(parse_due(task, now)?.days_until(now))
}

/// Pending tasks due within `0..=horizon_days` calendar days that were not
/// reported before. The returned set is what the caller should carry into the
/// next call.
pub fn detect_due_soon(
    tasks: &[Task],
    now: OffsetDateTime,
    horizon_days: u32,
    already_notified: &BTreeSet<String>,
    policy: NotifiedPolicy,
) -> DueSoonReport {
    let mut report = DueSoonReport::default();
    let mut qualifying = HashSet::new();

    for task in tasks {
        match qualifies(task, now, horizon_days) {
            Ok(true) => {
                qualifying.insert(task.id.as_str());
                if !already_notified.contains(&task.id) {
                    report.to_notify.push(task.clone());
                }
            }
            Ok(false) => {}
            Err(error) => report.issues.push(issue(task, error)),
        }
    }

    report.notified = match policy {
        NotifiedPolicy::Keep => already_notified.clone(),
        NotifiedPolicy::ResetWhenNotDue => already_notified
            .iter()
            .filter(|id| qualifying.contains(id.as_str()))
            .cloned()
            .collect(),
    };
    report
        .notified
        .extend(report.to_notify.iter().map(|task| task.id.clone()));

    tracing::debug!(
        to_notify = report.to_notify.len(),
        notified = report.notified.len(),
        "due-soon detection finished"
    );
    report
}

fn qualifies(task: &Task, now: OffsetDateTime, horizon_days: u32) -> Result<bool, AppError> {
    if classify(task, now)? != TaskStatus::Pending {
        return Ok(false);
    }
    let days = days_until_due(task, now)?;
    Ok((0..=i64::from(horizon_days)).contains(&days))
}
