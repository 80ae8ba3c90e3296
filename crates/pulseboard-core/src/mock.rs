//! Deterministic mock provider.
//!
//! Generates plausible LinkedIn-shaped and GA4-shaped daily series from a
//! sine-chain pseudo-random generator. The same `(day_count, mix)` seed
//! always yields the same series, so snapshots are reproducible across
//! refreshes and tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::daterange::last_n_days;
use crate::provider::{ProviderError, SeriesProvider};
use crate::{Account, AccountKind, DailyRecord, WebDailyRecord};

const SOURCES: [&str; 5] = [
    "linkedin / organic",
    "linkedin / paid",
    "direct / none",
    "google / cpc",
    "newsletter / email",
];

/// Cheap deterministic generator, uniform-ish in `[0, 1)`.
struct SineRng {
    state: f64,
}

impl SineRng {
    fn new(seed: f64) -> Self {
        Self {
            state: seed.sin() * 1e4,
        }
    }

    fn next(&mut self) -> f64 {
        self.state = self.state.sin() * 1e4;
        self.state - self.state.floor()
    }
}

struct GeneratedDay {
    record: DailyRecord,
    sessions: u64,
    conversions: u64,
    source: String,
}

/// One series per account mix, always covering the last `day_count`
/// calendar days. Paid activity runs every third day; organic volume
/// scales with the mix so accounts are distinguishable.
fn generate(day_count: usize, mix: u64) -> Vec<GeneratedDay> {
    let mut rng = SineRng::new(day_count as f64 * 13.0 + mix as f64 * 7.0);
    let mut followers = 1000 + (rng.next() * 500.0).round() as u64;

    last_n_days(day_count as u32)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            // The paid roll is consumed every day to keep the stream
            // aligned, but only lands on paid days.
            let paid_roll = 50.0 + rng.next() * 250.0;
            let paid = if i % 3 == 0 { paid_roll } else { 0.0 };
            let organic = 300.0 + rng.next() * 300.0 * mix as f64 + rng.next() * 200.0;
            let impressions =
                organic * (1.6 + rng.next() * 0.6) + paid * (2.2 + rng.next() * 0.8);
            let clicks = impressions * (0.02 + rng.next() * 0.02);
            let engagements = clicks * (0.6 + rng.next() * 0.5);
            let spend = paid * (0.5 + rng.next() * 0.5);
            let gain = rng.next() * 5.0 + if i % 7 == 0 { 10.0 } else { 2.0 };
            followers += gain.round() as u64;
            let sessions = clicks * (0.6 + rng.next() * 0.4);
            let conversions = sessions * (0.03 + rng.next() * 0.03);
            let source_idx = (rng.next() * SOURCES.len() as f64) as usize % SOURCES.len();

            GeneratedDay {
                record: DailyRecord {
                    date,
                    organic_reach: organic.round() as u64,
                    paid_reach: paid.round() as u64,
                    impressions: impressions.round() as u64,
                    clicks: clicks.round() as u64,
                    engagements: engagements.round() as u64,
                    spend: (spend * 100.0).round() / 100.0,
                    followers,
                },
                sessions: sessions.round() as u64,
                conversions: conversions.round() as u64,
                source: SOURCES[source_idx].to_string(),
            }
        })
        .collect()
}

/// Deterministic in-process provider with optional simulated latency.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    latency: Duration,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// The demo roster the dashboard ships with.
    pub fn demo_roster() -> Vec<Account> {
        [
            ("personal-1", "Maren Holst", AccountKind::Personal),
            ("personal-2", "Jonas Beck", AccountKind::Personal),
            ("business-1", "Northwind Studio", AccountKind::Business),
            ("business-2", "Fjordlight Labs", AccountKind::Business),
        ]
        .into_iter()
        .map(|(id, name, kind)| Account {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        })
        .collect()
    }

    /// Per-account seed component, derived from the account's position in
    /// the request. A request with the same ids in the same order is
    /// reproducible; the same id can map to a different series when the
    /// selection around it changes.
    fn mix_for(index: usize) -> u64 {
        index as u64 + 1
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl SeriesProvider for MockProvider {
    async fn fetch_account_series(
        &self,
        account_ids: &[String],
        day_count: usize,
    ) -> Result<HashMap<String, Vec<DailyRecord>>, ProviderError> {
        self.simulate_latency().await;
        Ok(account_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let series = generate(day_count, Self::mix_for(i))
                    .into_iter()
                    .map(|g| g.record)
                    .collect();
                (id.clone(), series)
            })
            .collect())
    }

    async fn fetch_analytics_series(
        &self,
        day_count: usize,
    ) -> Result<Vec<WebDailyRecord>, ProviderError> {
        self.simulate_latency().await;
        Ok(generate(day_count, 2)
            .into_iter()
            .map(|g| WebDailyRecord {
                date: g.record.date,
                sessions: g.sessions,
                conversions: g.conversions,
                source: g.source,
            })
            .collect())
    }
}
