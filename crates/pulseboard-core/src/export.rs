//! CSV export of the merged time series.
//!
//! The wire format is deliberately plain: a fixed header row, then each
//! value JSON-stringified and comma-joined, so day keys come out quoted
//! and numbers raw with no locale or currency formatting.

use std::io;
use std::path::Path;

use serde_json::Value;

use crate::AggregatedDay;

pub const EXPORT_FILENAME: &str = "dashboard_timeseries.csv";

pub const EXPORT_COLUMNS: [&str; 12] = [
    "date",
    "organicReach",
    "paidReach",
    "impressions",
    "clicks",
    "engagements",
    "spend",
    "sessions",
    "conversions",
    "prevReach",
    "prevSessions",
    "prevConversions",
];

fn row_values(day: &AggregatedDay) -> [Value; 12] {
    [
        Value::from(day.date.as_str()),
        Value::from(day.organic_reach),
        Value::from(day.paid_reach),
        Value::from(day.impressions),
        Value::from(day.clicks),
        Value::from(day.engagements),
        Value::from(day.spend),
        Value::from(day.sessions),
        Value::from(day.conversions),
        Value::from(day.prev_reach),
        Value::from(day.prev_sessions),
        Value::from(day.prev_conversions),
    ]
}

/// Render the series as CSV text, one row per day in input order.
pub fn to_csv(days: &[AggregatedDay]) -> String {
    let mut out = EXPORT_COLUMNS.join(",");
    for day in days {
        out.push('\n');
        let row: Vec<String> = row_values(day).iter().map(Value::to_string).collect();
        out.push_str(&row.join(","));
    }
    out
}

/// Write the series to `path`, creating or truncating the file.
pub fn write_csv(path: &Path, days: &[AggregatedDay]) -> io::Result<()> {
    std::fs::write(path, to_csv(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, organic: u64, spend: f64) -> AggregatedDay {
        AggregatedDay {
            date: date.to_string(),
            organic_reach: organic,
            paid_reach: 10,
            impressions: 500,
            clicks: 12,
            engagements: 7,
            spend,
            followers: 1200,
            sessions: 40,
            conversions: 2,
            prev_reach: 90,
            prev_sessions: 35,
            prev_conversions: 1,
        }
    }

    #[test]
    fn header_matches_fixed_column_order() {
        let csv = to_csv(&[]);
        assert_eq!(
            csv,
            "date,organicReach,paidReach,impressions,clicks,engagements,\
             spend,sessions,conversions,prevReach,prevSessions,prevConversions"
        );
    }

    #[test]
    fn one_line_per_day_plus_header() {
        let days = vec![day("2025-03-01", 100, 12.5), day("2025-03-02", 110, 0.0)];
        let csv = to_csv(&days);
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn values_are_json_stringified() {
        let csv = to_csv(&[day("2025-03-01", 100, 12.5)]);
        let row = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields.len(), EXPORT_COLUMNS.len());
        assert_eq!(fields[0], "\"2025-03-01\"");
        assert_eq!(fields[1], "100");
        assert_eq!(fields[6], "12.5");
        assert_eq!(fields[9], "90");
    }

    #[test]
    fn rows_keep_input_order() {
        let days = vec![day("2025-03-02", 1, 0.0), day("2025-03-01", 2, 0.0)];
        let csv = to_csv(&days);
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[1].starts_with("\"2025-03-02\""));
        assert!(lines[2].starts_with("\"2025-03-01\""));
    }

    #[test]
    fn write_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILENAME);
        write_csv(&path, &[day("2025-03-01", 100, 1.25)]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("date,organicReach"));
    }
}
