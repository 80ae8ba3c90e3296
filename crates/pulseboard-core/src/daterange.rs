//! Date-range presets, manual ranges and day-key resolution.
//!
//! All pipeline stages key days by local-calendar `YYYY-MM-DD` strings;
//! this module is the only place that produces them.

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid date range: end {end} is before start {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// A rolling window ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePreset {
    pub label: String,
    pub days: u32,
}

impl RangePreset {
    pub fn last_days(days: u32) -> Self {
        Self {
            label: format!("Last {days} days"),
            days,
        }
    }

    /// The presets offered by the dashboard, in cycle order.
    pub fn defaults() -> Vec<RangePreset> {
        [14, 30, 90].into_iter().map(Self::last_days).collect()
    }
}

/// An explicit start/end pair, both endpoints inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The range portion of the filter state. A manual range, when set,
/// overrides the preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub preset: RangePreset,
    pub manual: Option<ManualRange>,
}

impl Default for RangeSelection {
    fn default() -> Self {
        Self::preset(30)
    }
}

impl RangeSelection {
    pub fn preset(days: u32) -> Self {
        Self {
            preset: RangePreset::last_days(days),
            manual: None,
        }
    }

    pub fn manual(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            manual: Some(ManualRange { start, end }),
            ..Self::default()
        }
    }

    /// Human label for the active range, e.g. `Last 30 days` or
    /// `2025-03-01 → 2025-03-14`.
    pub fn label(&self) -> String {
        match &self.manual {
            Some(m) => format!(
                "{} → {}",
                m.start.format(DAY_KEY_FORMAT),
                m.end.format(DAY_KEY_FORMAT)
            ),
            None => self.preset.label.clone(),
        }
    }

    /// Resolve to the ordered, duplicate-free day-key sequence this
    /// selection covers. Resolution happens against today's local date, so
    /// a preset resolved across a day boundary shifts by one day.
    pub fn resolve(&self) -> Result<Vec<String>, RangeError> {
        match &self.manual {
            Some(m) => dates_between(m.start, m.end),
            None => Ok(last_n_days(self.preset.days)),
        }
    }
}

/// The last `n` calendar days ending today, oldest first.
pub fn last_n_days(n: u32) -> Vec<String> {
    let today = Local::now().date_naive();
    (0..i64::from(n))
        .rev()
        .map(|offset| {
            (today - Duration::days(offset))
                .format(DAY_KEY_FORMAT)
                .to_string()
        })
        .collect()
}

/// Every day from `start` through `end` inclusive, oldest first.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Result<Vec<String>, RangeError> {
    if end < start {
        return Err(RangeError::EndBeforeStart { start, end });
    }
    let mut keys = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut day = start;
    while day <= end {
        keys.push(day.format(DAY_KEY_FORMAT).to_string());
        day += Duration::days(1);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_n_days_length_and_order() {
        let keys = last_n_days(14);
        assert_eq!(keys.len(), 14);
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        sorted.dedup();
        assert_eq!(sorted.len(), 14);
        let today = Local::now().date_naive().format(DAY_KEY_FORMAT).to_string();
        assert_eq!(keys.last().unwrap(), &today);
    }

    #[test]
    fn last_zero_days_is_empty() {
        assert!(last_n_days(0).is_empty());
    }

    #[test]
    fn dates_between_inclusive_endpoints() {
        let keys = dates_between(date(2025, 2, 27), date(2025, 3, 2)).unwrap();
        assert_eq!(keys, ["2025-02-27", "2025-02-28", "2025-03-01", "2025-03-02"]);
    }

    #[test]
    fn dates_between_single_day() {
        let keys = dates_between(date(2025, 3, 1), date(2025, 3, 1)).unwrap();
        assert_eq!(keys, ["2025-03-01"]);
    }

    #[test]
    fn dates_between_rejects_reversed() {
        let err = dates_between(date(2025, 3, 2), date(2025, 3, 1)).unwrap_err();
        assert_eq!(
            err,
            RangeError::EndBeforeStart {
                start: date(2025, 3, 2),
                end: date(2025, 3, 1),
            }
        );
    }

    #[test]
    fn manual_overrides_preset() {
        let selection = RangeSelection::manual(date(2025, 1, 1), date(2025, 1, 7));
        assert_eq!(selection.resolve().unwrap().len(), 7);
        assert_eq!(selection.label(), "2025-01-01 → 2025-01-07");
    }

    #[test]
    fn preset_resolution_is_stable_within_a_day() {
        let selection = RangeSelection::preset(30);
        assert_eq!(selection.resolve().unwrap(), selection.resolve().unwrap());
        assert_eq!(selection.label(), "Last 30 days");
    }

    #[test]
    fn default_presets_cycle_order() {
        let days: Vec<u32> = RangePreset::defaults().iter().map(|p| p.days).collect();
        assert_eq!(days, [14, 30, 90]);
    }
}
