#![deny(clippy::all)]

pub mod aggregator;
pub mod daterange;
pub mod export;
pub mod mock;
pub mod provider;

pub use aggregator::*;
pub use daterange::{ManualRange, RangeError, RangePreset, RangeSelection};
pub use provider::{ProviderError, SeriesProvider};

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// One social record per account per day, as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyRecord {
    /// Day key, `YYYY-MM-DD`.
    pub date: String,
    pub organic_reach: u64,
    pub paid_reach: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub engagements: u64,
    /// Currency amount, two decimal places.
    pub spend: f64,
    /// Cumulative follower count, non-decreasing within one account's series.
    pub followers: u64,
}

/// One web-analytics record per day, flat (not keyed by account).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebDailyRecord {
    pub date: String,
    pub sessions: u64,
    pub conversions: u64,
    /// Attribution label, e.g. `"google / cpc"`. Empty means unattributed.
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Personal,
    Business,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Personal => "personal",
            AccountKind::Business => "business",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
}

/// The complete, explicit filter input. Any change triggers a full reload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub selected_accounts: Vec<String>,
    pub range: RangeSelection,
    pub compare: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected_accounts: Vec::new(),
            range: RangeSelection::default(),
            compare: false,
        }
    }
}

/// One row of the merged output series, one per resolved day key.
///
/// The `prev_*` fields are aligned by ordinal position within the range,
/// not by calendar date, and stay zero when comparison is disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedDay {
    pub date: String,
    pub organic_reach: u64,
    pub paid_reach: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub engagements: u64,
    pub spend: f64,
    pub followers: u64,
    pub sessions: u64,
    pub conversions: u64,
    pub prev_reach: u64,
    pub prev_sessions: u64,
    pub prev_conversions: u64,
}

impl AggregatedDay {
    pub fn total_reach(&self) -> u64 {
        self.organic_reach.saturating_add(self.paid_reach)
    }
}

/// Period sums across the merged series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub organic_reach: u64,
    pub paid_reach: u64,
    pub impressions: u64,
    pub engagements: u64,
    pub clicks: u64,
    pub spend: f64,
    pub sessions: u64,
    pub conversions: u64,
}

impl Totals {
    pub fn total_reach(&self) -> u64 {
        self.organic_reach.saturating_add(self.paid_reach)
    }
}

/// Safe-division ratios over one period's totals. Denominator 0 yields 0,
/// never an error or NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedRatios {
    pub click_through_rate: f64,
    pub cost_per_click: f64,
    pub cost_per_mille: f64,
    pub conversion_rate: f64,
}

impl DerivedRatios {
    pub fn from_totals(totals: &Totals) -> Self {
        Self {
            click_through_rate: safe_div(totals.clicks as f64, totals.impressions as f64),
            cost_per_click: safe_div(totals.spend, totals.clicks as f64),
            cost_per_mille: safe_div(totals.spend, totals.impressions as f64) * 1000.0,
            conversion_rate: safe_div(totals.conversions as f64, totals.sessions as f64),
        }
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// A defined period-over-period change, as a signed fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub ratio: f64,
}

impl Delta {
    /// `▲ 12.3% vs prev` / `▼ 4.0% vs prev`.
    pub fn caption(&self) -> String {
        let arrow = if self.ratio >= 0.0 { "▲" } else { "▼" };
        format!("{} {:.1}% vs prev", arrow, self.ratio.abs() * 100.0)
    }
}

/// Period-over-period delta. Defined only when comparison is enabled and the
/// previous value is finite and non-zero; callers fall back to an
/// absolute-value caption otherwise.
pub fn delta(compare: bool, current: f64, previous: f64) -> Option<Delta> {
    if !compare || previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some(Delta {
        ratio: (current - previous) / previous,
    })
}

/// Sessions and conversions grouped by attribution label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceTraffic {
    pub source: String,
    pub sessions: u64,
    pub conversions: u64,
}

/// Period sums for a single account, for the breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    pub organic_reach: u64,
    pub paid_reach: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub engagements: u64,
    pub spend: f64,
}

/// Everything the presentation layer consumes for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub days: Vec<AggregatedDay>,
    pub totals: Totals,
    pub previous_totals: Totals,
    pub ratios: DerivedRatios,
    pub previous_ratios: DerivedRatios,
    pub sources: Vec<SourceTraffic>,
    pub accounts: Vec<AccountSummary>,
    /// Effective comparison flag. Downgraded from the filter when the
    /// previous-period fetch failed mid-refresh.
    pub compare: bool,
    pub warning: Option<String>,
    #[serde(skip)]
    pub generation: u64,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("provider request failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Monotonically increasing refresh tokens. Each refresh takes a token from
/// `begin`; a result is installed only while its token is still current, so
/// out-of-order provider resolutions are discarded instead of clobbering a
/// newer snapshot.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

/// Resolve the filter's day keys, fetch the series, and aggregate.
///
/// The current-period account and analytics fetches run concurrently; with
/// comparison enabled the previous-period pair joins them, so up to four
/// requests are in flight at once. A current-period failure aborts the
/// refresh. A previous-period failure downgrades comparison for this cycle
/// and records a warning instead.
pub async fn load_snapshot<P: SeriesProvider>(
    provider: &P,
    roster: &[Account],
    filter: &FilterState,
    generation: u64,
) -> Result<DashboardSnapshot, DashboardError> {
    let day_keys = filter.range.resolve()?;
    let day_count = day_keys.len();
    debug!(generation, day_count, compare = filter.compare, "loading snapshot");

    let mut compare = filter.compare;
    let mut warning = None;

    let (by_account, web, prev_by_account, prev_web) = if compare {
        let (cur_accounts, cur_web, prev_accounts, prev_web) = tokio::join!(
            provider.fetch_account_series(&filter.selected_accounts, day_count),
            provider.fetch_analytics_series(day_count),
            provider.fetch_account_series(&filter.selected_accounts, day_count),
            provider.fetch_analytics_series(day_count),
        );
        let by_account = cur_accounts?;
        let web = cur_web?;
        match (prev_accounts, prev_web) {
            (Ok(prev_by_account), Ok(prev_web)) => (by_account, web, prev_by_account, prev_web),
            (Err(err), _) | (_, Err(err)) => {
                warn!(%err, "previous-period fetch failed, comparison disabled");
                compare = false;
                warning = Some(format!(
                    "previous-period fetch failed, comparison disabled: {err}"
                ));
                (by_account, web, Default::default(), Vec::new())
            }
        }
    } else {
        let (cur_accounts, cur_web) = tokio::join!(
            provider.fetch_account_series(&filter.selected_accounts, day_count),
            provider.fetch_analytics_series(day_count),
        );
        (cur_accounts?, cur_web?, Default::default(), Vec::new())
    };

    let mut days = aggregator::merge_accounts(&day_keys, &by_account);
    aggregator::join_analytics(&mut days, &web);

    let totals = aggregator::totals(&days);
    let mut previous_totals = Totals::default();
    if compare {
        let prev_merged = aggregator::merge_sorted(&prev_by_account);
        aggregator::align_previous(&mut days, &prev_merged, &prev_web);
        previous_totals = aggregator::previous_totals(&prev_merged, &prev_web, day_count);
    }

    let ratios = DerivedRatios::from_totals(&totals);
    let previous_ratios = DerivedRatios::from_totals(&previous_totals);
    let sources = aggregator::traffic_by_source(&web);
    let accounts = aggregator::account_breakdown(roster, &filter.selected_accounts, &by_account);

    Ok(DashboardSnapshot {
        days,
        totals,
        previous_totals,
        ratios,
        previous_ratios,
        sources,
        accounts,
        compare,
        warning,
        generation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn filter(days: u32, accounts: &[&str], compare: bool) -> FilterState {
        FilterState {
            selected_accounts: accounts.iter().map(|s| s.to_string()).collect(),
            range: RangeSelection::preset(days),
            compare,
        }
    }

    #[test]
    fn safe_div_zero_denominator() {
        assert_eq!(safe_div(5.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(6.0, 3.0), 2.0);
    }

    #[test]
    fn ratios_zero_when_denominators_zero() {
        let ratios = DerivedRatios::from_totals(&Totals::default());
        assert_eq!(ratios.click_through_rate, 0.0);
        assert_eq!(ratios.cost_per_click, 0.0);
        assert_eq!(ratios.cost_per_mille, 0.0);
        assert_eq!(ratios.conversion_rate, 0.0);
    }

    #[test]
    fn ratios_finite_and_non_negative() {
        let totals = Totals {
            organic_reach: 100,
            paid_reach: 50,
            impressions: 2000,
            engagements: 30,
            clicks: 40,
            spend: 125.50,
            sessions: 80,
            conversions: 4,
        };
        let ratios = DerivedRatios::from_totals(&totals);
        for value in [
            ratios.click_through_rate,
            ratios.cost_per_click,
            ratios.cost_per_mille,
            ratios.conversion_rate,
        ] {
            assert!(value.is_finite());
            assert!(value >= 0.0);
        }
        assert!((ratios.click_through_rate - 0.02).abs() < 1e-9);
        assert!((ratios.cost_per_mille - 62.75).abs() < 1e-9);
    }

    #[test]
    fn delta_requires_compare_and_nonzero_previous() {
        assert!(delta(false, 10.0, 5.0).is_none());
        assert!(delta(true, 10.0, 0.0).is_none());
        assert!(delta(true, 10.0, f64::NAN).is_none());
        let d = delta(true, 15.0, 10.0).unwrap();
        assert!((d.ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn delta_caption_direction() {
        assert_eq!(delta(true, 15.0, 10.0).unwrap().caption(), "▲ 50.0% vs prev");
        assert_eq!(delta(true, 9.0, 10.0).unwrap().caption(), "▼ 10.0% vs prev");
    }

    #[test]
    fn generation_counter_discards_stale_tokens() {
        let counter = GenerationCounter::new();
        let first = counter.begin();
        assert!(counter.is_current(first));
        let second = counter.begin();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[tokio::test]
    async fn snapshot_day_length_matches_range() {
        let provider = MockProvider::new();
        let roster = MockProvider::demo_roster();
        let f = filter(14, &["personal-1", "personal-2"], false);
        let snapshot = load_snapshot(&provider, &roster, &f, 1).await.unwrap();
        assert_eq!(snapshot.days.len(), 14);
        assert!(!snapshot.compare);
        assert_eq!(snapshot.previous_totals, Totals::default());
        assert!(snapshot.days.iter().all(|d| d.prev_reach == 0
            && d.prev_sessions == 0
            && d.prev_conversions == 0));
    }

    #[tokio::test]
    async fn snapshot_zero_accounts_yields_zero_totals() {
        let provider = MockProvider::new();
        let roster = MockProvider::demo_roster();
        let f = filter(7, &[], false);
        let snapshot = load_snapshot(&provider, &roster, &f, 1).await.unwrap();
        assert_eq!(snapshot.days.len(), 7);
        assert_eq!(snapshot.totals.total_reach(), 0);
        assert_eq!(snapshot.totals.impressions, 0);
        // Web analytics still contribute; the social side is zero-filled.
        assert!(snapshot.totals.sessions > 0);
        assert!(snapshot.accounts.is_empty());
    }

    #[tokio::test]
    async fn snapshot_compare_populates_previous_period() {
        let provider = MockProvider::new();
        let roster = MockProvider::demo_roster();
        let f = filter(14, &["personal-1", "personal-2"], true);
        let snapshot = load_snapshot(&provider, &roster, &f, 1).await.unwrap();
        assert!(snapshot.compare);
        assert!(snapshot.previous_totals.total_reach() > 0);
        let reach_delta = delta(
            snapshot.compare,
            snapshot.totals.total_reach() as f64,
            snapshot.previous_totals.total_reach() as f64,
        );
        let caption = reach_delta.unwrap().caption();
        assert!(caption.starts_with("▲") || caption.starts_with("▼"));
        assert!(caption.ends_with("% vs prev"));
    }

    #[tokio::test]
    async fn snapshot_totals_sum_selected_accounts() {
        let provider = MockProvider::new();
        let roster = MockProvider::demo_roster();
        let ids = ["personal-1".to_string(), "personal-2".to_string()];
        let f = filter(14, &["personal-1", "personal-2"], true);
        let snapshot = load_snapshot(&provider, &roster, &f, 1).await.unwrap();

        let by_account = provider.fetch_account_series(&ids, 14).await.unwrap();
        let expected: u64 = by_account
            .values()
            .flatten()
            .map(|r| r.organic_reach)
            .sum();
        assert_eq!(snapshot.totals.organic_reach, expected);
    }

    #[tokio::test]
    async fn snapshot_rejects_reversed_manual_range() {
        let provider = MockProvider::new();
        let roster = MockProvider::demo_roster();
        let start = chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let f = FilterState {
            selected_accounts: vec!["personal-1".to_string()],
            range: RangeSelection::manual(start, end),
            compare: false,
        };
        let err = load_snapshot(&provider, &roster, &f, 1).await.unwrap_err();
        assert!(matches!(err, DashboardError::Range(_)));
    }

    /// Fails every fetch after the first `ok_calls` calls.
    struct FlakyProvider {
        inner: MockProvider,
        ok_calls: u32,
        calls: AtomicU32,
    }

    impl FlakyProvider {
        fn failing_after(ok_calls: u32) -> Self {
            Self {
                inner: MockProvider::new(),
                ok_calls,
                calls: AtomicU32::new(0),
            }
        }

        fn should_fail(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst) >= self.ok_calls
        }
    }

    #[async_trait]
    impl SeriesProvider for FlakyProvider {
        async fn fetch_account_series(
            &self,
            account_ids: &[String],
            day_count: usize,
        ) -> Result<HashMap<String, Vec<DailyRecord>>, ProviderError> {
            if self.should_fail() {
                return Err(ProviderError::Network("connection reset".to_string()));
            }
            self.inner.fetch_account_series(account_ids, day_count).await
        }

        async fn fetch_analytics_series(
            &self,
            day_count: usize,
        ) -> Result<Vec<WebDailyRecord>, ProviderError> {
            if self.should_fail() {
                return Err(ProviderError::Network("connection reset".to_string()));
            }
            self.inner.fetch_analytics_series(day_count).await
        }
    }

    #[tokio::test]
    async fn previous_period_failure_downgrades_comparison() {
        // Four fetches per compare refresh; the join polls the current pair
        // first, so allowing two leaves both previous-period calls failing.
        let provider = FlakyProvider::failing_after(2);
        let roster = MockProvider::demo_roster();
        let f = filter(7, &["personal-1"], true);
        let snapshot = load_snapshot(&provider, &roster, &f, 1).await.unwrap();
        assert!(!snapshot.compare);
        assert!(snapshot.warning.is_some());
        assert_eq!(snapshot.previous_totals, Totals::default());
        assert_eq!(snapshot.days.len(), 7);
        assert!(snapshot.totals.total_reach() > 0);
    }

    #[tokio::test]
    async fn current_period_failure_aborts_refresh() {
        let provider = FlakyProvider::failing_after(0);
        let roster = MockProvider::demo_roster();
        let f = filter(7, &["personal-1"], false);
        let err = load_snapshot(&provider, &roster, &f, 1).await.unwrap_err();
        assert!(matches!(err, DashboardError::Provider(_)));
    }
}
