use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single check-in as it is stored on the disk. The canonical collection holds at most one
/// record per `date` and is sorted by `date` descending.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone, Copy, Hash)]
pub struct CheckinRecord {
    pub date: NaiveDate,
    /// Milliseconds since epoch. Only used for "last check-in time".
    pub timestamp: i64,
}

impl CheckinRecord {
    pub fn new(date: NaiveDate, timestamp: i64) -> Self {
        Self { date, timestamp }
    }
}

/// Streak numbers reported after every check-in attempt.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Read model backing the status endpoint.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub current_streak: u32,
    #[serde(rename = "lastCheckInTime")]
    pub last_checkin_time: Option<i64>,
    pub best_streak: u32,
}

/// One date of a [DashboardWindow].
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize)]
pub struct WindowDay {
    pub date: NaiveDate,
    pub checked: bool,
}

/// Trailing range of dates annotated with checked/missed status. Derived, never stored.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWindow {
    /// Every distinct checked date, most recent first.
    pub checkins: Vec<NaiveDate>,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Every distinct checked date, most recent first.
    pub checked_dates: Vec<NaiveDate>,
    /// Dates of the window without a check-in, in window order (today first).
    pub missed_dates: Vec<NaiveDate>,
    /// The window itself, today first.
    pub days: Vec<WindowDay>,
}

/// Result of the only mutating operation. Failures are reported instead of propagated so that the
/// caller decides how to present them.
#[derive(Debug)]
pub enum CheckinOutcome {
    Recorded(StreakSummary),
    AlreadyCheckedIn(StreakSummary),
    Failed(anyhow::Error),
}

impl CheckinOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            CheckinOutcome::Recorded(_) => "success",
            CheckinOutcome::AlreadyCheckedIn(_) => "info",
            CheckinOutcome::Failed(_) => "error",
        }
    }
}
