//! Deadline classification
//!
//! Turns a task's deadline into the urgency shown next to it: how many whole
//! days are left, a short label, and whether the task is overdue.
//!
//! Days are counted between calendar dates, not by dividing a duration: both
//! instants are moved into the viewer's time zone and truncated to their date
//! first. A deadline 20 hours away that falls after midnight is one day away.
//!
//! Everything here is a pure function of its inputs. "Now" is always passed
//! in, never read from the clock.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use trackhub_shared::deadline::{classify, remaining_days};
//! use trackhub_shared::models::task::TaskStatus;
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
//! let deadline = Utc.with_ymd_and_hms(2024, 3, 11, 4, 0, 0).unwrap();
//!
//! let days = remaining_days(deadline, now, &Utc);
//! assert_eq!(days, 1);
//! assert_eq!(classify(TaskStatus::InProgress, days).to_string(), "Due in 1 day");
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::TaskStatus;

/// Error type for deadline input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeadlineError {
    /// No deadline given
    #[error("Deadline is empty")]
    Empty,

    /// Neither an RFC 3339 timestamp nor a `YYYY-MM-DD` date
    #[error("Invalid deadline '{0}': expected RFC 3339 timestamp or YYYY-MM-DD date")]
    Malformed(String),

    /// The date has no valid start-of-day in the time zone
    #[error("Deadline '{0}' does not exist in the configured time zone")]
    NonexistentLocalTime(String),
}

/// Whole calendar days from `now` to `deadline`, as seen in `tz`
///
/// Negative when the deadline's date is in the past, zero when it is today,
/// positive otherwise. The time of day on either side never affects the
/// result.
pub fn remaining_days<Tz: TimeZone>(deadline: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> i64 {
    let deadline_day = deadline.with_timezone(tz).date_naive();
    let today = now.with_timezone(tz).date_naive();

    deadline_day.signed_duration_since(today).num_days()
}

/// Human status of a task's deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Completed,
    Overdue,
    DueToday,
    /// Due in this many days (always >= 1)
    DueIn(u64),
}

impl fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadlineStatus::Completed => write!(f, "Completed"),
            DeadlineStatus::Overdue => write!(f, "Overdue"),
            DeadlineStatus::DueToday => write!(f, "Due is Today"),
            DeadlineStatus::DueIn(1) => write!(f, "Due in 1 day"),
            DeadlineStatus::DueIn(days) => write!(f, "Due in {} days", days),
        }
    }
}

/// Derives the deadline label for a task
///
/// A completed task is "Completed" no matter its deadline.
pub fn classify(status: TaskStatus, remaining_days: i64) -> DeadlineStatus {
    match status {
        TaskStatus::Completed => DeadlineStatus::Completed,
        TaskStatus::InProgress if remaining_days < 0 => DeadlineStatus::Overdue,
        TaskStatus::InProgress if remaining_days == 0 => DeadlineStatus::DueToday,
        TaskStatus::InProgress => DeadlineStatus::DueIn(remaining_days.unsigned_abs()),
    }
}

/// Whether a task warrants the actionable "overdue" alert
///
/// Separate from the label: only in-progress tasks whose deadline day has
/// passed qualify.
pub fn is_overdue(status: TaskStatus, remaining_days: i64) -> bool {
    status == TaskStatus::InProgress && remaining_days < 0
}

/// Text of the overdue alert for a task
pub fn overdue_alert_message(task_name: &str) -> String {
    format!(
        "Important: Task \"{}\" is overdue. You can change the deadline.",
        task_name
    )
}

/// Derived urgency of a task, computed per request and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Urgency {
    /// Signed whole days until the deadline
    pub remaining_days: i64,

    /// Display label ("Overdue", "Due in 3 days", ...)
    pub label: String,

    /// Whether the overdue alert applies
    pub overdue: bool,
}

impl Urgency {
    /// Evaluates a task's urgency at `now` in `tz`
    pub fn evaluate<Tz: TimeZone>(
        status: TaskStatus,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self {
        let days = remaining_days(deadline, now, tz);

        Self {
            remaining_days: days,
            label: classify(status, days).to_string(),
            overdue: is_overdue(status, days),
        }
    }
}

/// Parses user-supplied deadline input
///
/// Accepts an RFC 3339 timestamp, or a plain `YYYY-MM-DD` date which is taken
/// as the start of that day in `tz`.
///
/// # Errors
///
/// Returns `DeadlineError` for empty or unparseable input.
///
/// # Example
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use trackhub_shared::deadline::parse_deadline;
///
/// let tz = FixedOffset::east_opt(2 * 3600).unwrap();
/// let deadline = parse_deadline("2024-03-11", &tz).unwrap();
/// assert_eq!(deadline, Utc.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap());
/// ```
pub fn parse_deadline<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>, DeadlineError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DeadlineError::Empty);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| DeadlineError::Malformed(input.to_string()))?;

    let start_of_day = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DeadlineError::Malformed(input.to_string()))?;

    tz.from_local_datetime(&start_of_day)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| DeadlineError::NonexistentLocalTime(input.to_string()))
}
