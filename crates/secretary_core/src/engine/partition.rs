use super::classify::{classify, issue, parse_due};
use crate::error::DateIssue;
use crate::model::{DueDate, Task, TaskStatus};
use time::{Date, OffsetDateTime, UtcOffset};

/// Disjoint views over one task snapshot. Every input task lands in exactly
/// one bucket or, when its due date is unreadable, in `issues`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub active: Vec<Task>,
    pub completed_history: Vec<Task>,
    pub expired_history: Vec<Task>,
    pub issues: Vec<DateIssue>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.active.len()
            + self.completed_history.len()
            + self.expired_history.len()
            + self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DueDate,
    Priority,
}

pub fn partition(tasks: &[Task], now: OffsetDateTime) -> Partition {
    let mut result = Partition::default();

    for task in tasks {
        match classify(task, now) {
            Ok(TaskStatus::Pending) => result.active.push(task.clone()),
            Ok(TaskStatus::Completed) => result.completed_history.push(task.clone()),
            Ok(TaskStatus::ExpiredUncompleted) => result.expired_history.push(task.clone()),
            Err(err) => result.issues.push(issue(task, err)),
        }
    }

    tracing::debug!(
        active = result.active.len(),
        completed = result.completed_history.len(),
        expired = result.expired_history.len(),
        issues = result.issues.len(),
        "partitioned tasks"
    );
    result
}

/// Keeps tasks due on `date` as seen from `offset`.
pub fn date_filter(tasks: &[Task], date: Date, offset: UtcOffset) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match DueDate::parse(&task.due_date, offset) {
            Ok(due) => due.date_in(offset) == date,
            Err(err) => {
                issue(task, err);
                false
            }
        })
        .cloned()
        .collect()
}

/// Case-insensitive match on title or description. A blank query keeps all.
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.to_vec();
    }

    tasks
        .iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&needle)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|description| description.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable; tasks with unreadable due dates go last in input order.
pub fn sort_by_due_date(tasks: &[Task], offset: UtcOffset) -> Vec<Task> {
    let mut keyed: Vec<(Option<OffsetDateTime>, &Task)> = tasks
        .iter()
        .map(|task| {
            let key = DueDate::parse(&task.due_date, offset)
                .ok()
                .map(|due| due.instant(offset));
            (key, task)
        })
        .collect();

    keyed.sort_by(|(left, _), (right, _)| match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    keyed.into_iter().map(|(_, task)| task.clone()).collect()
}

/// Stable; high before medium before low.
pub fn sort_by_priority(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|task| task.priority);
    sorted
}

pub fn sort_tasks(tasks: &[Task], key: SortKey, offset: UtcOffset) -> Vec<Task> {
    match key {
        SortKey::DueDate => sort_by_due_date(tasks, offset),
        SortKey::Priority => sort_by_priority(tasks),
    }
}

/// Pending tasks due on `now`'s calendar day.
pub fn due_today(tasks: &[Task], now: OffsetDateTime) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| {
            matches!(classify(task, now), Ok(TaskStatus::Pending))
                && parse_due(task, now).is_ok_and(|due| due.date_in(now.offset()) == now.date())
        })
        .cloned()
        .collect()
}
