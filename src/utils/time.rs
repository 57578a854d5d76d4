use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a string in areyoualive.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses an ISO 8601 date. A full date-time is accepted as well, in which case only its date part
/// is kept.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(date_time) = value.parse::<NaiveDateTime>() {
        return Some(date_time.date());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|v| v.date_naive())
}

/// Milliseconds since epoch of the start of `date` in local time. Usually that is midnight.
pub fn midnight_millis(date: NaiveDate) -> i64 {
    match start_of_day(date, &Local) {
        Some(v) => v.timestamp_millis(),
        // The whole day was skipped by the time zone.
        None => Utc
            .from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .timestamp_millis(),
    }
}

/// First wall clock minute of `date` that exists in `tz`. When a DST jump skips midnight this is
/// the end of the gap, so the result still falls on `date`.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24 * 60)
        .map(|minute| midnight + Duration::minutes(minute))
        .find_map(|v| tz.from_local_datetime(&v).earliest())
}

/// Returns the next moment strictly after `now` at which the wall clock shows `at`.
pub fn next_occurrence(now: DateTime<Local>, at: NaiveTime) -> DateTime<Local> {
    let mut date = now.date_naive();
    loop {
        if let Some(candidate) = date.and_time(at).and_local_timezone(Local).earliest() {
            if candidate > now {
                return candidate;
            }
        }
        date = match date.succ_opt() {
            Some(v) => v,
            None => return now + Duration::days(1),
        };
    }
}
