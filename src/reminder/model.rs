use std::fmt;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};
use thiserror::Error;

pub type ReminderId = u32;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ReminderId,
    pub message: String,
    pub date: String,
    pub time: String,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter all details")]
    MissingDetails,

    #[error("Invalid date or time")]
    InvalidDateTime,

    #[error("Selected time is in the past!")]
    InPast,
}

/// A parsed, not yet validated-against-now, reminder instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub at: DateTime<Local>,
}

impl Schedule {
    /// Parse `YYYY-MM-DD` and `HH:MM` into a device-local instant.
    ///
    /// A wall-clock time skipped by a DST transition is rejected; a repeated
    /// one resolves to its first occurrence.
    pub fn parse(date: &str, time: &str) -> Result<Self, ValidationError> {
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDateTime)?;
        let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
            .map_err(|_| ValidationError::InvalidDateTime)?;

        let at = match Local.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(at) => at,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => return Err(ValidationError::InvalidDateTime),
        };

        Ok(Self { date, time, at })
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

/// Transient, user-facing outcome of a list operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    ReminderSet { date: String, time: String },
    ReminderDeleted,
    Rejected(ValidationError),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::ReminderSet { date, time } => {
                write!(f, "Reminder set for {} at {}", date, time)
            }
            Status::ReminderDeleted => f.write_str("Reminder deleted"),
            Status::Rejected(err) => write!(f, "{}", err),
        }
    }
}
