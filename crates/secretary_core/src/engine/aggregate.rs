use super::classify::{classify, issue, parse_due};
use crate::error::DateIssue;
use crate::model::{Priority, Task, TaskStatus};
use serde::Serialize;
use time::{Month, OffsetDateTime};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    fn bump(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_count: usize,
    pub completed_count: usize,
    pub pending_count: usize,
    pub expired_count: usize,
    /// In `0.0..=1.0`; zero for an empty snapshot.
    pub completion_rate: f64,
    pub priority_counts: PriorityCounts,
    #[serde(skip)]
    pub issues: Vec<DateIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: Month,
    pub completed: usize,
    pub expired: usize,
    pub pending: usize,
}

impl MonthBucket {
    fn empty(year: i32, month: Month) -> Self {
        Self {
            year,
            month,
            completed: 0,
            expired: 0,
            pending: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.expired + self.pending
    }
}

pub fn aggregate(tasks: &[Task], now: OffsetDateTime) -> Stats {
    let mut stats = Stats {
        total_count: tasks.len(),
        ..Stats::default()
    };

    for task in tasks {
        stats.priority_counts.bump(task.priority);
        match classify(task, now) {
            Ok(TaskStatus::Completed) => stats.completed_count += 1,
            Ok(TaskStatus::Pending) => stats.pending_count += 1,
            Ok(TaskStatus::ExpiredUncompleted) => stats.expired_count += 1,
            Err(err) => stats.issues.push(issue(task, err)),
        }
    }

    stats.completion_rate = completion_rate(stats.completed_count, stats.total_count);
    stats
}

pub fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

/// Upper bound on the trailing window; larger requests are clamped to it.
pub const MAX_MONTHS_BACK: u32 = 120;

/// Trailing `months_back` calendar months ending with `now`'s month, oldest
/// first. A task belongs to the month of its due date only.
pub fn monthly_buckets(tasks: &[Task], now: OffsetDateTime, months_back: u32) -> Vec<MonthBucket> {
    let months_back = months_back.min(MAX_MONTHS_BACK);
    let mut buckets = Vec::with_capacity(months_back as usize);
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..months_back {
        buckets.push(MonthBucket::empty(year, month));
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    buckets.reverse();

    if buckets.is_empty() {
        return buckets;
    }

    for task in tasks {
        let due = match parse_due(task, now) {
            Ok(due) => due,
            Err(err) => {
                issue(task, err);
                continue;
            }
        };
        let day = due.date_in(now.offset());
        let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| bucket.year == day.year() && bucket.month == day.month())
        else {
            continue;
        };

        match classify(task, now) {
            Ok(TaskStatus::Completed) => bucket.completed += 1,
            Ok(TaskStatus::ExpiredUncompleted) => bucket.expired += 1,
            Ok(TaskStatus::Pending) => bucket.pending += 1,
            Err(_) => {}
        }
    }

    buckets
}
