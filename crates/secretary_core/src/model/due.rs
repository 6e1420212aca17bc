use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// A parsed due date. Date-only values compare at day granularity so a task
/// due today stays pending until the day is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    Day(Date),
    At(OffsetDateTime),
}

impl DueDate {
    /// Accepts `YYYY-MM-DD` or a date-time, `T` or space separated, with
    /// minute or second precision. A trailing `Z` or `±HH:MM` is honoured;
    /// without one the date-time is read in `offset`.
    pub fn parse(raw: &str, offset: UtcOffset) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_date("due date is required"));
        }

        if let Ok(day) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
            return Ok(Self::Day(day));
        }

        let normalized = trimmed.replacen(' ', "T", 1);
        if let Some(at) = parse_with_offset(&normalized) {
            return Ok(Self::At(at));
        }

        parse_naive(&normalized)
            .map(|naive| Self::At(naive.assume_offset(offset)))
            .ok_or_else(|| AppError::invalid_date(format!("'{trimmed}' is not a date")))
    }

    /// Calendar day of the due date as seen from `offset`.
    pub fn date_in(self, offset: UtcOffset) -> Date {
        match self {
            Self::Day(day) => day,
            Self::At(at) => at.to_offset(offset).date(),
        }
    }

    /// Strictly in the past relative to `now`.
    pub fn is_past(self, now: OffsetDateTime) -> bool {
        match self {
            Self::Day(day) => day < now.date(),
            Self::At(at) => at < now,
        }
    }

    /// Whole calendar days from `now`'s date to the due date; negative when overdue.
    pub fn days_until(self, now: OffsetDateTime) -> i64 {
        (self.date_in(now.offset()) - now.date()).whole_days()
    }

    pub fn instant(self, offset: UtcOffset) -> OffsetDateTime {
        match self {
            Self::Day(day) => day.midnight().assume_offset(offset),
            Self::At(at) => at,
        }
    }

    pub fn to_canonical(self) -> Result<String, AppError> {
        let formatted = match self {
            Self::Day(day) => day.format(format_description!("[year]-[month]-[day]")),
            Self::At(at) => at.format(&Rfc3339),
        };
        formatted.map_err(|err| AppError::invalid_data(err.to_string()))
    }
}

fn parse_with_offset(normalized: &str) -> Option<OffsetDateTime> {
    if let Ok(at) = OffsetDateTime::parse(normalized, &Rfc3339) {
        return Some(at);
    }
    if let Some(utc) = normalized.strip_suffix('Z') {
        return parse_naive(utc).map(PrimitiveDateTime::assume_utc);
    }
    OffsetDateTime::parse(
        normalized,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
    )
    .ok()
}

/// Expects the `T` separator already in place.
fn parse_naive(normalized: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
    })
    .ok()
}
