use super::classify::issue;
use crate::error::AppError;
use crate::model::{DueDate, Task};
use time::{Date, Month, Time, UtcOffset};

const HOLIDAYS: [(Month, u8, &str); 15] = [
    (Month::January, 1, "New Year's Day"),
    (Month::January, 15, "Martin Luther King Jr. Day"),
    (Month::February, 14, "Valentine's Day"),
    (Month::February, 19, "Presidents' Day"),
    (Month::March, 17, "St. Patrick's Day"),
    (Month::April, 1, "April Fool's Day"),
    (Month::May, 27, "Memorial Day"),
    (Month::June, 19, "Juneteenth"),
    (Month::July, 4, "Independence Day"),
    (Month::September, 2, "Labor Day"),
    (Month::October, 31, "Halloween"),
    (Month::November, 11, "Veterans Day"),
    (Month::November, 28, "Thanksgiving"),
    (Month::December, 25, "Christmas"),
    (Month::December, 31, "New Year's Eve"),
];

const MEETINGS: [(Month, u8, u8, &str); 5] = [
    (Month::February, 20, 10, "Team Meeting"),
    (Month::February, 22, 14, "Project Review"),
    (Month::February, 26, 11, "Weekly Sync"),
    (Month::March, 1, 9, "Monthly Planning"),
    (Month::March, 15, 13, "Quarterly Review"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: Date,
    pub title: &'static str,
}

/// Recurring meeting with a fixed start time, local to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    pub id: String,
    pub date: Date,
    pub starts_at: Time,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Task,
    Holiday,
    Meeting,
}

impl EventKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Holiday => "holiday",
            Self::Meeting => "meeting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: Date,
    pub events: Vec<CalendarEvent>,
}

pub fn holidays_for_year(year: i32) -> Vec<Holiday> {
    HOLIDAYS
        .iter()
        .filter_map(|(month, day, title)| {
            Date::from_calendar_date(year, *month, *day)
                .ok()
                .map(|date| Holiday { date, title: *title })
        })
        .collect()
}

pub fn meetings_for_year(year: i32) -> Vec<Meeting> {
    MEETINGS
        .iter()
        .enumerate()
        .filter_map(|(index, (month, day, hour, title))| {
            let date = Date::from_calendar_date(year, *month, *day).ok()?;
            let starts_at = Time::from_hms(*hour, 0, 0).ok()?;
            Some(Meeting {
                id: format!("meeting-{}-{year}", index + 1),
                date,
                starts_at,
                title: *title,
            })
        })
        .collect()
}

/// One entry per day of the month: holidays, then meetings by start time,
/// then tasks in input order.
pub fn month_view(
    tasks: &[Task],
    year: i32,
    month: Month,
    offset: UtcOffset,
) -> Result<Vec<CalendarDay>, AppError> {
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|err| AppError::invalid_input(err.to_string()))?;

    let mut days = Vec::with_capacity(31);
    let mut cursor = Some(first);
    while let Some(date) = cursor.filter(|date| date.month() == month) {
        days.push(CalendarDay {
            date,
            events: Vec::new(),
        });
        cursor = date.next_day();
    }

    for holiday in holidays_for_year(year) {
        if let Some(day) = day_slot(&mut days, holiday.date) {
            day.events.push(CalendarEvent {
                id: format!("holiday-{}", holiday.date),
                title: holiday.title.to_string(),
                kind: EventKind::Holiday,
            });
        }
    }

    for meeting in meetings_for_year(year) {
        if let Some(day) = day_slot(&mut days, meeting.date) {
            day.events.push(CalendarEvent {
                id: meeting.id,
                title: meeting.title.to_string(),
                kind: EventKind::Meeting,
            });
        }
    }

    for task in tasks {
        let due = match DueDate::parse(&task.due_date, offset) {
            Ok(due) => due,
            Err(err) => {
                issue(task, err);
                continue;
            }
        };
        if let Some(day) = day_slot(&mut days, due.date_in(offset)) {
            day.events.push(CalendarEvent {
                id: task.id.clone(),
                title: task.title.clone(),
                kind: EventKind::Task,
            });
        }
    }

    Ok(days)
}

fn day_slot(days: &mut [CalendarDay], date: Date) -> Option<&mut CalendarDay> {
    days.iter_mut().find(|day| day.date == date)
}

/// Badge text: the first letter of every word.
pub fn abbreviation(title: &str) -> String {
    title
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}
