//! The seam between the pipeline and whatever produces the raw series.
//!
//! A real deployment would implement [`SeriesProvider`] against the
//! LinkedIn and GA4 APIs; the crate ships [`crate::mock::MockProvider`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{DailyRecord, WebDailyRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of the raw daily series.
///
/// Both fetches are invoked once per refresh for the current period and,
/// when comparison is enabled, once more for the equal-length immediately
/// preceding period.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// One chronological record per day per requested account,
    /// `day_count` records each.
    async fn fetch_account_series(
        &self,
        account_ids: &[String],
        day_count: usize,
    ) -> Result<HashMap<String, Vec<DailyRecord>>, ProviderError>;

    /// The flat web-analytics series, `day_count` chronological records.
    async fn fetch_analytics_series(
        &self,
        day_count: usize,
    ) -> Result<Vec<WebDailyRecord>, ProviderError>;
}
