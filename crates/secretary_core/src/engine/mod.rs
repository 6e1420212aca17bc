//! Pure task classification and aggregation.
//!
//! Every function takes a task snapshot and an explicit `now`; nothing here
//! reads the clock, touches storage or mutates its input.

mod aggregate;
mod calendar;
mod classify;
mod due_soon;
mod partition;

pub use aggregate::{
    MAX_MONTHS_BACK, MonthBucket, PriorityCounts, Stats, aggregate, completion_rate,
    monthly_buckets,
};
pub use calendar::{
    CalendarDay, CalendarEvent, EventKind, Holiday, Meeting, abbreviation, holidays_for_year,
    meetings_for_year, month_view,
};
pub use classify::{classify, is_expired};
pub use due_soon::{DueSoonReport, NotifiedPolicy, days_until_due, detect_due_soon};
pub use partition::{
    Partition, SortKey, date_filter, due_today, partition, search, sort_by_due_date,
    sort_by_priority, sort_tasks,
};
