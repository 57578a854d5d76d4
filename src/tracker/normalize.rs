use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use crate::utils::time::{midnight_millis, parse_date};

use super::entities::CheckinRecord;

/// Converts whatever was found in the check-in file into the canonical collection.
///
/// Two historical shapes are accepted per entry: a bare date string and an object with `date` and
/// an optional `timestamp`. Entries without a usable date are dropped. Each entry maps to zero or
/// one record in input order, then the records are stably sorted by date, most recent first.
/// Duplicate dates are kept as they are. [CheckinService](super::service::CheckinService) drops them
/// whenever it writes the collection back.
pub fn normalize(raw: &[Value]) -> Vec<CheckinRecord> {
    let mut records = raw.iter().filter_map(normalize_entry).collect::<Vec<_>>();
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}

fn normalize_entry(entry: &Value) -> Option<CheckinRecord> {
    let record = match entry {
        Value::String(date) => parse_date(date).map(|date| CheckinRecord {
            date,
            timestamp: midnight_millis(date),
        }),
        Value::Object(fields) => normalize_object(fields),
        _ => None,
    };

    if record.is_none() {
        debug!("Dropping malformed check-in entry {entry}");
    }
    record
}

fn normalize_object(fields: &Map<String, Value>) -> Option<CheckinRecord> {
    let date = fields.get("date")?.as_str().and_then(parse_date)?;
    let timestamp = fields
        .get("timestamp")
        .and_then(coerce_timestamp)
        .unwrap_or_else(|| midnight_millis(date));
    Some(CheckinRecord { date, timestamp })
}

/// Integer coercion of a stored timestamp. Zero counts as absent, the same way an empty value does.
fn coerce_timestamp(value: &Value) -> Option<i64> {
    let timestamp = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v as i64)
            })
        }
        _ => None,
    }?;
    (timestamp != 0).then_some(timestamp)
}

/// Distinct dates of a collection, most recent first.
pub fn distinct_dates(records: &[CheckinRecord]) -> Vec<NaiveDate> {
    let mut dates = records.iter().map(|v| v.date).collect::<Vec<_>>();
    dates.sort_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    use crate::{
        tracker::entities::CheckinRecord,
        utils::time::midnight_millis,
    };

    use super::{distinct_dates, normalize};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_plain_date_strings() {
        let raw = vec![json!("2024-01-01"), json!("2024-01-03"), json!("2024-01-02")];
        let records = normalize(&raw);

        assert_eq!(
            records,
            vec![
                CheckinRecord::new(date(2024, 1, 3), midnight_millis(date(2024, 1, 3))),
                CheckinRecord::new(date(2024, 1, 2), midnight_millis(date(2024, 1, 2))),
                CheckinRecord::new(date(2024, 1, 1), midnight_millis(date(2024, 1, 1))),
            ]
        );
    }

    #[test]
    fn test_normalize_objects_keep_timestamp() {
        let raw = vec![
            json!({"date": "2024-01-01", "timestamp": 1_704_103_200_000_i64}),
            json!({"date": "2024-01-02", "timestamp": "1704189600000"}),
            json!({"date": "2024-01-03", "timestamp": 1_704_276_000_000.7}),
        ];
        let records = normalize(&raw);

        assert_eq!(records[0], CheckinRecord::new(date(2024, 1, 3), 1_704_276_000_000));
        assert_eq!(records[1], CheckinRecord::new(date(2024, 1, 2), 1_704_189_600_000));
        assert_eq!(records[2], CheckinRecord::new(date(2024, 1, 1), 1_704_103_200_000));
    }

    #[test]
    fn test_normalize_defaults_missing_or_bad_timestamp_to_midnight() {
        let raw = vec![
            json!({"date": "2024-01-01"}),
            json!({"date": "2024-01-02", "timestamp": null}),
            json!({"date": "2024-01-03", "timestamp": "soon"}),
            json!({"date": "2024-01-04", "timestamp": 0}),
            json!({"date": "2024-01-05", "timestamp": [1]}),
        ];
        let records = normalize(&raw);

        assert_eq!(records.len(), 5);
        for record in records {
            assert_eq!(record.timestamp, midnight_millis(record.date));
        }
    }

    #[test]
    fn test_normalize_drops_malformed_entries() {
        let raw = vec![
            json!("not a date"),
            json!({"timestamp": 5}),
            json!({"date": ""}),
            json!({"date": 20240101}),
            json!({"date": "2024-13-01"}),
            json!(42),
            Value::Null,
            json!(["2024-01-01"]),
            json!("2024-01-07"),
        ];
        let records = normalize(&raw);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, date(2024, 1, 7));
    }

    #[test]
    fn test_normalize_accepts_date_times_in_strings() {
        let raw = vec![json!("2024-01-07T08:15:00"), json!({"date": "2024-01-08T21:00:00"})];
        let dates = normalize(&raw).into_iter().map(|v| v.date).collect::<Vec<_>>();
        assert_eq!(dates, vec![date(2024, 1, 8), date(2024, 1, 7)]);
    }

    #[test]
    fn test_normalize_keeps_duplicates_in_input_order() {
        let raw = vec![
            json!({"date": "2024-01-01", "timestamp": 1}),
            json!({"date": "2024-01-02", "timestamp": 5}),
            json!({"date": "2024-01-01", "timestamp": 2}),
        ];
        let records = normalize(&raw);

        assert_eq!(
            records,
            vec![
                CheckinRecord::new(date(2024, 1, 2), 5),
                CheckinRecord::new(date(2024, 1, 1), 1),
                CheckinRecord::new(date(2024, 1, 1), 2),
            ]
        );
    }

    #[test]
    fn test_normalize_is_stable_on_canonical_collection() {
        let canonical = vec![
            CheckinRecord::new(date(2024, 1, 10), 1_704_880_000_000),
            CheckinRecord::new(date(2024, 1, 9), 1_704_790_000_000),
            CheckinRecord::new(date(2024, 1, 2), 1_704_190_000_000),
        ];
        let stored = serde_json::to_value(&canonical).unwrap();
        let raw = stored.as_array().unwrap();

        assert_eq!(normalize(raw), canonical);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_distinct_dates() {
        let records = vec![
            CheckinRecord::new(date(2024, 1, 1), 1),
            CheckinRecord::new(date(2024, 1, 3), 1),
            CheckinRecord::new(date(2024, 1, 1), 2),
        ];
        assert_eq!(distinct_dates(&records), vec![date(2024, 1, 3), date(2024, 1, 1)]);
    }
}
