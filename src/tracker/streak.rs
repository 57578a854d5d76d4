//! Streak accounting over a check-in collection. Every function here is pure: the collection and
//! "today" come in as arguments.
//!
//! The current streak is anchored at today's date. A collection whose most recent check-in is
//! yesterday has a current streak of 0 until today is checked in, regardless of how long the run
//! ending yesterday is.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use super::{
    entities::{CheckinRecord, DashboardWindow, StatusSnapshot, StreakSummary, WindowDay},
    normalize::distinct_dates,
};

/// Number of consecutive days ending at `today` (inclusive) that have a check-in.
pub fn current_streak(records: &[CheckinRecord], today: NaiveDate) -> u32 {
    let dates = records.iter().map(|v| v.date).collect::<HashSet<_>>();

    let mut streak = 0;
    let mut day = Some(today);
    while let Some(current) = day.filter(|v| dates.contains(v)) {
        streak += 1;
        day = current.pred_opt();
    }
    streak
}

/// Longest run of consecutive days found anywhere in the collection.
pub fn best_streak(records: &[CheckinRecord]) -> u32 {
    let mut dates = distinct_dates(records);
    dates.reverse();

    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        current = match previous {
            Some(previous) if date - previous == Duration::days(1) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(date);
    }
    best
}

/// Most recent timestamp of the collection.
pub fn last_checkin_time(records: &[CheckinRecord]) -> Option<i64> {
    records.iter().map(|v| v.timestamp).max()
}

pub fn streak_summary(records: &[CheckinRecord], today: NaiveDate) -> StreakSummary {
    StreakSummary {
        current_streak: current_streak(records, today),
        best_streak: best_streak(records),
    }
}

pub fn status_snapshot(records: &[CheckinRecord], today: NaiveDate) -> StatusSnapshot {
    StatusSnapshot {
        current_streak: current_streak(records, today),
        last_checkin_time: last_checkin_time(records),
        best_streak: best_streak(records),
    }
}

/// Builds the window of `window_days` dates ending at `today` and splits it into checked and
/// missed dates. `checked_dates` is not limited to the window.
pub fn dashboard_window(
    records: &[CheckinRecord],
    window_days: usize,
    today: NaiveDate,
) -> DashboardWindow {
    let checked = distinct_dates(records);
    let lookup = checked.iter().copied().collect::<HashSet<_>>();

    let days = std::iter::successors(Some(today), |v| v.pred_opt())
        .take(window_days)
        .map(|date| WindowDay {
            date,
            checked: lookup.contains(&date),
        })
        .collect::<Vec<_>>();

    let missed_dates = days
        .iter()
        .filter(|v| !v.checked)
        .map(|v| v.date)
        .collect();

    DashboardWindow {
        checkins: checked.clone(),
        current_streak: current_streak(records, today),
        best_streak: best_streak(records),
        checked_dates: checked,
        missed_dates,
        days,
    }
}
