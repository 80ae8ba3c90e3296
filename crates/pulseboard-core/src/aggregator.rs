//! Pure aggregation over provider output and resolved day keys.
//!
//! Merging is sum-per-field per day key, so splitting the account set into
//! disjoint groups and adding the merged outputs equals merging the union.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    Account, AccountSummary, AggregatedDay, DailyRecord, SourceTraffic, Totals, WebDailyRecord,
};

/// Per-day social totals across the selected accounts, before the
/// analytics join.
///
/// Spend accumulates in integer cents: the parallel merge reduces
/// partial maps in nondeterministic order, and integer addition keeps
/// the sum bit-identical across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialDay {
    pub date: String,
    pub organic_reach: u64,
    pub paid_reach: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub engagements: u64,
    pub followers: u64,
    spend_cents: u64,
}

impl SocialDay {
    pub fn reach(&self) -> u64 {
        self.organic_reach.saturating_add(self.paid_reach)
    }

    pub fn spend(&self) -> f64 {
        self.spend_cents as f64 / 100.0
    }

    fn add_record(&mut self, record: &DailyRecord) {
        if self.date.is_empty() {
            self.date = record.date.clone();
        }
        self.organic_reach += record.organic_reach;
        self.paid_reach += record.paid_reach;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
        self.engagements += record.engagements;
        self.spend_cents += (record.spend * 100.0).round() as u64;
        self.followers += record.followers;
    }

    fn absorb(&mut self, other: SocialDay) {
        if self.date.is_empty() {
            self.date = other.date;
        }
        self.organic_reach += other.organic_reach;
        self.paid_reach += other.paid_reach;
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.engagements += other.engagements;
        self.spend_cents += other.spend_cents;
        self.followers += other.followers;
    }
}

fn merge_day_map(by_account: &HashMap<String, Vec<DailyRecord>>) -> HashMap<String, SocialDay> {
    by_account
        .par_iter()
        .flat_map(|(_, records)| records.par_iter())
        .fold(HashMap::new, |mut acc: HashMap<String, SocialDay>, record| {
            acc.entry(record.date.clone())
                .or_default()
                .add_record(record);
            acc
        })
        .reduce(HashMap::new, |mut left, right| {
            for (date, day) in right {
                left.entry(date).or_default().absorb(day);
            }
            left
        })
}

/// Merge the selected accounts' series onto the resolved day keys. Output
/// length always equals `day_keys.len()`; days with no contribution are
/// all-zero.
pub fn merge_accounts(
    day_keys: &[String],
    by_account: &HashMap<String, Vec<DailyRecord>>,
) -> Vec<AggregatedDay> {
    let merged = merge_day_map(by_account);
    day_keys
        .iter()
        .map(|key| {
            let mut day = AggregatedDay {
                date: key.clone(),
                ..Default::default()
            };
            if let Some(social) = merged.get(key) {
                day.organic_reach = social.organic_reach;
                day.paid_reach = social.paid_reach;
                day.impressions = social.impressions;
                day.clicks = social.clicks;
                day.engagements = social.engagements;
                day.spend = social.spend();
                day.followers = social.followers;
            }
            day
        })
        .collect()
}

/// Merge across accounts and return the per-day totals in chronological
/// order, used for the previous period where no day-key frame exists.
pub fn merge_sorted(by_account: &HashMap<String, Vec<DailyRecord>>) -> Vec<SocialDay> {
    let mut days: Vec<SocialDay> = merge_day_map(by_account).into_values().collect();
    days.sort_by(|a, b| a.date.cmp(&b.date));
    days
}

/// Join the web-analytics series onto the merged days by day key. Web
/// records outside the resolved range are dropped; days without a web
/// record keep zero sessions/conversions.
pub fn join_analytics(days: &mut [AggregatedDay], web: &[WebDailyRecord]) {
    let mut by_date: HashMap<&str, (u64, u64)> = HashMap::new();
    for record in web {
        let entry = by_date.entry(record.date.as_str()).or_default();
        entry.0 += record.sessions;
        entry.1 += record.conversions;
    }
    for day in days {
        if let Some((sessions, conversions)) = by_date.get(day.date.as_str()) {
            day.sessions += sessions;
            day.conversions += conversions;
        }
    }
}

/// Attach previous-period values by ordinal position: the i-th previous
/// day lands on the i-th current day. Positions past the end of either
/// previous series stay zero.
pub fn align_previous(
    days: &mut [AggregatedDay],
    prev_social: &[SocialDay],
    prev_web: &[WebDailyRecord],
) {
    for (i, day) in days.iter_mut().enumerate() {
        if let Some(social) = prev_social.get(i) {
            day.prev_reach = social.reach();
        }
        if let Some(record) = prev_web.get(i) {
            day.prev_sessions = record.sessions;
            day.prev_conversions = record.conversions;
        }
    }
}

/// Period sums over the merged series.
pub fn totals(days: &[AggregatedDay]) -> Totals {
    let mut totals = Totals::default();
    for day in days {
        totals.organic_reach += day.organic_reach;
        totals.paid_reach += day.paid_reach;
        totals.impressions += day.impressions;
        totals.engagements += day.engagements;
        totals.clicks += day.clicks;
        totals.spend += day.spend;
        totals.sessions += day.sessions;
        totals.conversions += day.conversions;
    }
    totals
}

/// Previous-period sums, truncated to the current range length so both
/// periods cover the same number of days.
pub fn previous_totals(
    prev_social: &[SocialDay],
    prev_web: &[WebDailyRecord],
    limit: usize,
) -> Totals {
    let mut totals = Totals::default();
    for day in prev_social.iter().take(limit) {
        totals.organic_reach += day.organic_reach;
        totals.paid_reach += day.paid_reach;
        totals.impressions += day.impressions;
        totals.engagements += day.engagements;
        totals.clicks += day.clicks;
        totals.spend += day.spend();
    }
    for record in prev_web.iter().take(limit) {
        totals.sessions += record.sessions;
        totals.conversions += record.conversions;
    }
    totals
}

/// Group the web series by attribution label. Empty labels collapse into
/// `"unknown"`. Sorted by sessions descending, then by label so equal
/// buckets keep a stable order.
pub fn traffic_by_source(web: &[WebDailyRecord]) -> Vec<SourceTraffic> {
    let mut buckets: HashMap<&str, (u64, u64)> = HashMap::new();
    for record in web {
        let label = if record.source.is_empty() {
            "unknown"
        } else {
            record.source.as_str()
        };
        let entry = buckets.entry(label).or_default();
        entry.0 += record.sessions;
        entry.1 += record.conversions;
    }
    let mut sources: Vec<SourceTraffic> = buckets
        .into_iter()
        .map(|(source, (sessions, conversions))| SourceTraffic {
            source: source.to_string(),
            sessions,
            conversions,
        })
        .collect();
    sources.sort_by(|a, b| {
        b.sessions
            .cmp(&a.sessions)
            .then_with(|| a.source.cmp(&b.source))
    });
    sources
}

/// Per-account period sums, in roster order, restricted to the selected
/// accounts present in the fetched series.
pub fn account_breakdown(
    roster: &[Account],
    selected: &[String],
    by_account: &HashMap<String, Vec<DailyRecord>>,
) -> Vec<AccountSummary> {
    roster
        .iter()
        .filter(|account| selected.contains(&account.id))
        .filter_map(|account| {
            let records = by_account.get(&account.id)?;
            let mut summary = AccountSummary {
                id: account.id.clone(),
                name: account.name.clone(),
                kind: account.kind,
                organic_reach: 0,
                paid_reach: 0,
                impressions: 0,
                clicks: 0,
                engagements: 0,
                spend: 0.0,
            };
            for record in records {
                summary.organic_reach += record.organic_reach;
                summary.paid_reach += record.paid_reach;
                summary.impressions += record.impressions;
                summary.clicks += record.clicks;
                summary.engagements += record.engagements;
                summary.spend += record.spend;
            }
            Some(summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountKind;

    fn record(date: &str, organic: u64, paid: u64) -> DailyRecord {
        DailyRecord {
            date: date.to_string(),
            organic_reach: organic,
            paid_reach: paid,
            impressions: organic * 2,
            clicks: organic / 10,
            engagements: organic / 20,
            spend: paid as f64 * 0.5,
            followers: 1000,
        }
    }

    fn web(date: &str, sessions: u64, conversions: u64, source: &str) -> WebDailyRecord {
        WebDailyRecord {
            date: date.to_string(),
            sessions,
            conversions,
            source: source.to_string(),
        }
    }

    fn keys(days: &[&str]) -> Vec<String> {
        days.iter().map(|d| d.to_string()).collect()
    }

    fn by_account(entries: &[(&str, Vec<DailyRecord>)]) -> HashMap<String, Vec<DailyRecord>> {
        entries
            .iter()
            .map(|(id, records)| (id.to_string(), records.clone()))
            .collect()
    }

    #[test]
    fn merge_output_length_matches_day_keys() {
        let day_keys = keys(&["2025-03-01", "2025-03-02", "2025-03-03"]);
        let accounts = by_account(&[("a", vec![record("2025-03-02", 100, 0)])]);
        let days = merge_accounts(&day_keys, &accounts);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].organic_reach, 0);
        assert_eq!(days[1].organic_reach, 100);
        assert_eq!(days[2].organic_reach, 0);
    }

    #[test]
    fn merge_sums_across_accounts_per_day() {
        let day_keys = keys(&["2025-03-01"]);
        let accounts = by_account(&[
            ("a", vec![record("2025-03-01", 100, 30)]),
            ("b", vec![record("2025-03-01", 50, 20)]),
        ]);
        let days = merge_accounts(&day_keys, &accounts);
        assert_eq!(days[0].organic_reach, 150);
        assert_eq!(days[0].paid_reach, 50);
        assert_eq!(days[0].impressions, 300);
        assert!((days[0].spend - 25.0).abs() < 1e-9);
    }

    #[test]
    fn merge_empty_accounts_zero_fills() {
        let day_keys = keys(&["2025-03-01", "2025-03-02"]);
        let days = merge_accounts(&day_keys, &HashMap::new());
        assert_eq!(days.len(), 2);
        assert!(days.iter().all(|d| d.total_reach() == 0 && d.spend == 0.0));
    }

    #[test]
    fn merge_is_additive_over_account_partitions() {
        let day_keys = keys(&["2025-03-01", "2025-03-02"]);
        let a = vec![record("2025-03-01", 100, 30), record("2025-03-02", 80, 0)];
        let b = vec![record("2025-03-01", 50, 20)];
        let c = vec![record("2025-03-02", 40, 10)];

        let all = merge_accounts(
            &day_keys,
            &by_account(&[("a", a.clone()), ("b", b.clone()), ("c", c.clone())]),
        );
        let left = merge_accounts(&day_keys, &by_account(&[("a", a), ("b", b)]));
        let right = merge_accounts(&day_keys, &by_account(&[("c", c)]));

        for i in 0..day_keys.len() {
            assert_eq!(
                all[i].organic_reach,
                left[i].organic_reach + right[i].organic_reach
            );
            assert_eq!(all[i].paid_reach, left[i].paid_reach + right[i].paid_reach);
            assert_eq!(
                all[i].impressions,
                left[i].impressions + right[i].impressions
            );
            assert_eq!(all[i].clicks, left[i].clicks + right[i].clicks);
            assert!((all[i].spend - (left[i].spend + right[i].spend)).abs() < 1e-9);
        }
    }

    #[test]
    fn merge_spend_is_bit_stable_across_runs() {
        // Many accounts with cent-fraction spends: float summation in
        // reduce order would drift in the last bit; cents must not.
        let day_keys = keys(&["2025-03-01"]);
        let accounts: HashMap<String, Vec<DailyRecord>> = (0..64)
            .map(|i| {
                let mut r = record("2025-03-01", 10, 0);
                r.spend = 0.01 + i as f64 * 0.01;
                (format!("acct-{i}"), vec![r])
            })
            .collect();

        let first = merge_accounts(&day_keys, &accounts);
        for _ in 0..10 {
            let again = merge_accounts(&day_keys, &accounts);
            assert_eq!(first[0].spend.to_bits(), again[0].spend.to_bits());
        }
        // 1 + 2 + ... + 64 cents.
        let expected_cents: u64 = (1..=64).sum();
        assert_eq!(first[0].spend, expected_cents as f64 / 100.0);
    }

    #[test]
    fn join_matches_by_day_key_not_position() {
        let day_keys = keys(&["2025-03-01", "2025-03-02"]);
        let accounts = by_account(&[("a", vec![record("2025-03-01", 100, 0)])]);
        let mut days = merge_accounts(&day_keys, &accounts);
        // Reverse order on purpose.
        let web_series = vec![web("2025-03-02", 20, 2, "x"), web("2025-03-01", 10, 1, "x")];
        join_analytics(&mut days, &web_series);
        assert_eq!(days[0].sessions, 10);
        assert_eq!(days[1].sessions, 20);
        assert_eq!(days[1].conversions, 2);
    }

    #[test]
    fn join_leaves_unmatched_days_zero() {
        let day_keys = keys(&["2025-03-01", "2025-03-02"]);
        let mut days = merge_accounts(&day_keys, &HashMap::new());
        join_analytics(&mut days, &[web("2025-03-02", 20, 2, "x")]);
        assert_eq!(days[0].sessions, 0);
        assert_eq!(days[1].sessions, 20);
    }

    #[test]
    fn join_drops_web_records_outside_range() {
        let day_keys = keys(&["2025-03-01"]);
        let mut days = merge_accounts(&day_keys, &HashMap::new());
        join_analytics(&mut days, &[web("2025-04-01", 99, 9, "x")]);
        assert_eq!(days[0].sessions, 0);
        assert_eq!(totals(&days).sessions, 0);
    }

    #[test]
    fn previous_alignment_is_positional() {
        let day_keys = keys(&["2025-03-03", "2025-03-04"]);
        let accounts = by_account(&[(
            "a",
            vec![record("2025-03-03", 100, 0), record("2025-03-04", 110, 0)],
        )]);
        let mut days = merge_accounts(&day_keys, &accounts);

        // Previous period carries different calendar dates entirely.
        let prev_accounts = by_account(&[(
            "a",
            vec![record("2025-03-01", 70, 10), record("2025-03-02", 80, 0)],
        )]);
        let prev_social = merge_sorted(&prev_accounts);
        let prev_web = vec![web("2025-03-01", 5, 1, "x"), web("2025-03-02", 6, 0, "x")];
        align_previous(&mut days, &prev_social, &prev_web);

        assert_eq!(days[0].prev_reach, 80);
        assert_eq!(days[1].prev_reach, 80);
        assert_eq!(days[0].prev_sessions, 5);
        assert_eq!(days[1].prev_sessions, 6);
        assert_eq!(days[0].prev_conversions, 1);
    }

    #[test]
    fn previous_alignment_short_series_stays_zero() {
        let day_keys = keys(&["2025-03-03", "2025-03-04", "2025-03-05"]);
        let mut days = merge_accounts(&day_keys, &HashMap::new());
        let prev_accounts = by_account(&[("a", vec![record("2025-03-01", 70, 0)])]);
        align_previous(
            &mut days,
            &merge_sorted(&prev_accounts),
            &[web("2025-03-01", 5, 1, "x")],
        );
        assert_eq!(days[0].prev_reach, 70);
        assert_eq!(days[1].prev_reach, 0);
        assert_eq!(days[2].prev_sessions, 0);
    }

    #[test]
    fn merge_sorted_orders_by_date() {
        let accounts = by_account(&[(
            "a",
            vec![record("2025-03-02", 80, 0), record("2025-03-01", 70, 0)],
        )]);
        let sorted = merge_sorted(&accounts);
        assert_eq!(sorted[0].date, "2025-03-01");
        assert_eq!(sorted[1].date, "2025-03-02");
    }

    #[test]
    fn totals_sum_all_days() {
        let day_keys = keys(&["2025-03-01", "2025-03-02"]);
        let accounts = by_account(&[(
            "a",
            vec![record("2025-03-01", 100, 30), record("2025-03-02", 50, 0)],
        )]);
        let mut days = merge_accounts(&day_keys, &accounts);
        join_analytics(
            &mut days,
            &[web("2025-03-01", 10, 1, "x"), web("2025-03-02", 20, 2, "x")],
        );
        let t = totals(&days);
        assert_eq!(t.organic_reach, 150);
        assert_eq!(t.paid_reach, 30);
        assert_eq!(t.total_reach(), 180);
        assert_eq!(t.sessions, 30);
        assert_eq!(t.conversions, 3);
        assert!((t.spend - 15.0).abs() < 1e-9);
    }

    #[test]
    fn previous_totals_truncate_to_range_length() {
        let prev_accounts = by_account(&[(
            "a",
            vec![
                record("2025-03-01", 10, 0),
                record("2025-03-02", 20, 0),
                record("2025-03-03", 40, 0),
            ],
        )]);
        let prev_web = vec![
            web("2025-03-01", 1, 0, "x"),
            web("2025-03-02", 2, 0, "x"),
            web("2025-03-03", 4, 0, "x"),
        ];
        let t = previous_totals(&merge_sorted(&prev_accounts), &prev_web, 2);
        assert_eq!(t.organic_reach, 30);
        assert_eq!(t.sessions, 3);
    }

    #[test]
    fn traffic_sorted_descending_with_unknown_bucket() {
        let series = vec![
            web("2025-03-01", 10, 1, "source-a"),
            web("2025-03-02", 20, 2, "source-a"),
            web("2025-03-01", 40, 4, "source-b"),
            web("2025-03-03", 5, 0, ""),
        ];
        let sources = traffic_by_source(&series);
        let labels: Vec<&str> = sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(labels, ["source-b", "source-a", "unknown"]);
        assert_eq!(sources[0].sessions, 40);
        assert_eq!(sources[1].sessions, 30);
        assert_eq!(sources[1].conversions, 3);
        assert_eq!(sources[2].sessions, 5);
    }

    #[test]
    fn traffic_equal_sessions_tie_break_by_label() {
        let series = vec![
            web("2025-03-01", 10, 0, "zeta"),
            web("2025-03-01", 10, 0, "alpha"),
        ];
        let sources = traffic_by_source(&series);
        assert_eq!(sources[0].source, "alpha");
        assert_eq!(sources[1].source, "zeta");
    }

    #[test]
    fn traffic_empty_series_is_empty() {
        assert!(traffic_by_source(&[]).is_empty());
    }

    #[test]
    fn breakdown_keeps_roster_order_and_selection() {
        let roster = vec![
            Account {
                id: "a".to_string(),
                name: "Alpha".to_string(),
                kind: AccountKind::Personal,
            },
            Account {
                id: "b".to_string(),
                name: "Beta".to_string(),
                kind: AccountKind::Business,
            },
        ];
        let accounts = by_account(&[
            ("a", vec![record("2025-03-01", 100, 30)]),
            ("b", vec![record("2025-03-01", 50, 0), record("2025-03-02", 25, 0)]),
        ]);

        let all = account_breakdown(&roster, &["b".to_string(), "a".to_string()], &accounts);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[1].id, "b");
        assert_eq!(all[1].organic_reach, 75);

        let only_b = account_breakdown(&roster, &["b".to_string()], &accounts);
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].name, "Beta");
    }
}
