use std::fmt::Write;

use ansi_term::Colour::{Green, Red, Yellow};
use ansi_term::Style;
use chrono::{DateTime, Local, NaiveDate};

use crate::{
    tracker::entities::{CheckinOutcome, DashboardWindow, StatusSnapshot, StreakSummary},
    utils::time::format_date,
};

const CHECKED_MARK: &str = "#";
const MISSED_MARK: &str = ".";

fn format_streaks(summary: StreakSummary) -> String {
    format!(
        "Current streak: {}\nBest streak:    {}",
        Style::new().bold().paint(summary.current_streak.to_string()),
        Style::new().bold().paint(summary.best_streak.to_string()),
    )
}

fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(v) => v.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

pub fn format_status(snapshot: &StatusSnapshot) -> String {
    let last = match snapshot.last_checkin_time {
        Some(millis) => format_timestamp(millis),
        None => Yellow.paint("never").to_string(),
    };
    format!(
        "{}\nLast check-in:  {last}",
        format_streaks(StreakSummary {
            current_streak: snapshot.current_streak,
            best_streak: snapshot.best_streak,
        })
    )
}

pub fn format_outcome(outcome: &CheckinOutcome) -> String {
    match outcome {
        CheckinOutcome::Recorded(summary) => format!(
            "{}\n{}",
            Green.bold().paint("Checked in"),
            format_streaks(*summary)
        ),
        CheckinOutcome::AlreadyCheckedIn(summary) => format!(
            "{}\n{}",
            Yellow.paint("Already checked in today"),
            format_streaks(*summary)
        ),
        CheckinOutcome::Failed(e) => format!("{} {e}", Red.bold().paint("Check-in failed:")),
    }
}

pub fn format_checkins(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        return Yellow.paint("No check-ins yet").to_string();
    }
    dates
        .iter()
        .map(|v| format_date(*v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints the window oldest first so that it reads left to right like a calendar strip.
pub fn format_dashboard(window: &DashboardWindow) -> String {
    let mut result = format_streaks(StreakSummary {
        current_streak: window.current_streak,
        best_streak: window.best_streak,
    });

    let strip = window
        .days
        .iter()
        .rev()
        .map(|v| {
            if v.checked {
                Green.paint(CHECKED_MARK).to_string()
            } else {
                Red.paint(MISSED_MARK).to_string()
            }
        })
        .collect::<String>();

    if let (Some(first), Some(last)) = (window.days.last(), window.days.first()) {
        let _ = write!(
            result,
            "\n{} {strip} {}",
            format_date(first.date),
            format_date(last.date)
        );
    }

    let missed = window.missed_dates.len();
    let _ = write!(
        result,
        "\nChecked {} of {} days, missed {}",
        window.days.len() - missed,
        window.days.len(),
        if missed == 0 {
            Green.paint(missed.to_string())
        } else {
            Red.paint(missed.to_string())
        }
    );
    result
}
