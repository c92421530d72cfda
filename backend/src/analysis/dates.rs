//! Days-since bucketing of a date column.
//!
//! Each parseable cell is turned into the whole number of days between the
//! evaluation time and that date, floored, so a date later today counts as
//! `-1`. Rows are bucketed by that number; each bucket keeps the first row it
//! saw as a sample and counts every row that fell into it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{cell_text, Record};

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Field added to each bucket's sample record.
pub const DAYS_SINCE_FIELD: &str = "daysSince";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// One days-since bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket {
    /// Label, e.g. `"10 days since"`.
    pub category: String,
    pub days_since: i64,
    /// First record of the bucket, with a `daysSince` field added.
    pub data: Record,
    /// Every record that fell into the bucket.
    pub count: usize,
}

/// Parse a cell as a calendar date or date-time.
///
/// Values without an offset are read as UTC; date-only values as UTC
/// midnight. Bare numbers are never dates.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
        }
    }

    None
}

/// Whole days from `date` to `now`, floored. Negative for future dates.
pub fn days_since(now: DateTime<Utc>, date: DateTime<Utc>) -> i64 {
    let elapsed_ms = now.timestamp_millis() - date.timestamp_millis();
    elapsed_ms.div_euclid(MS_PER_DAY)
}

/// Bucket label for a days-since value.
pub fn bucket_label(days: i64) -> String {
    format!("{} days since", days)
}

/// Bucket `records` by days since the date in `column`, relative to `now`.
///
/// Rows without the column, with empty text, or with an unparseable value
/// are left out. Buckets appear in the order they are first hit.
pub fn analyze_date_column(records: &[Record], column: &str, now: DateTime<Utc>) -> Vec<DateBucket> {
    let mut buckets: Vec<DateBucket> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for record in records {
        let Some(raw) = cell_text(record, column) else {
            continue;
        };
        let Some(date) = parse_date(&raw) else {
            continue;
        };

        let days = days_since(now, date);
        match index.get(&days) {
            Some(&i) => buckets[i].count += 1,
            None => {
                let mut sample = record.clone();
                sample.insert(DAYS_SINCE_FIELD.to_string(), Value::from(days));
                index.insert(days, buckets.len());
                buckets.push(DateBucket {
                    category: bucket_label(days),
                    days_since: days,
                    data: sample,
                    count: 1,
                });
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("2024/03/05"), Some(expected));
        assert_eq!(parse_date("03/05/2024"), Some(expected));
        assert_eq!(parse_date("05.03.2024"), Some(expected));
        assert_eq!(parse_date("2024-03-05T00:00:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-05T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_date("2024-03-05 00:00:00"), Some(expected));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date("12345"), None);
    }

    #[test]
    fn test_numeric_cells_are_not_dates() {
        assert_eq!(parse_date("5551234567"), None);
        assert_eq!(parse_date("1709596800000"), None);

        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let rows = records(vec![
            json!({"id": "1", "seen": "5551234567"}),
            json!({"id": "2", "seen": "2024-03-14"}),
        ]);
        let buckets = analyze_date_column(&rows, "seen", now);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].data["id"], "2");
    }

    #[test]
    fn test_days_since_floors() {
        let now = now();
        assert_eq!(days_since(now, now - Duration::days(10)), 10);
        assert_eq!(days_since(now, now - Duration::hours(23)), 0);
        assert_eq!(days_since(now, now + Duration::hours(1)), -1);
        assert_eq!(days_since(now, now + Duration::days(3)), -3);
    }

    #[test]
    fn test_ten_days_and_empty_date() {
        let ten_days_ago = (now() - Duration::days(10)).to_rfc3339();
        let rows = records(vec![
            json!({"id": "1", "created": ten_days_ago}),
            json!({"id": "2", "created": ""}),
        ]);

        let buckets = analyze_date_column(&rows, "created", now());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].category, "10 days since");
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[0].data["id"], "1");
        assert_eq!(buckets[0].data[DAYS_SINCE_FIELD], 10);
    }

    #[test]
    fn test_sample_is_first_and_count_is_total() {
        let rows = records(vec![
            json!({"id": "1", "d": "2024-03-10"}),
            json!({"id": "2", "d": "2024-03-14"}),
            json!({"id": "3", "d": "2024-03-10T08:00:00Z"}),
            json!({"id": "4", "d": "garbage"}),
            json!({"id": "5"}),
            json!({"id": "6", "d": "2024-03-10"}),
        ]);

        let buckets = analyze_date_column(&rows, "d", now());

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].days_since, 5);
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[0].data["id"], "1");
        assert_eq!(buckets[1].days_since, 1);
        assert_eq!(buckets[1].count, 1);

        let counted: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(counted, 4);
    }

    #[test]
    fn test_future_dates_are_negative() {
        let rows = records(vec![json!({"d": "2024-03-20"})]);
        let buckets = analyze_date_column(&rows, "d", now());
        assert_eq!(buckets[0].days_since, -5);
        assert_eq!(buckets[0].category, "-5 days since");
    }

    #[test]
    fn test_sample_does_not_touch_input() {
        let rows = records(vec![json!({"d": "2024-03-10"})]);
        let _ = analyze_date_column(&rows, "d", now());
        assert!(rows[0].get(DAYS_SINCE_FIELD).is_none());
    }
}
