use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use pulseboard_core::{
    load_snapshot, mock::MockProvider, Account, DashboardError, DashboardSnapshot, FilterState,
    GenerationCounter,
};

/// Blocking bridge between the synchronous TUI loop and the async
/// pipeline. Owns the runtime, the provider and the refresh tokens.
pub struct DataLoader {
    runtime: Runtime,
    provider: MockProvider,
    counter: GenerationCounter,
}

impl DataLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            runtime: Runtime::new().context("failed to start async runtime")?,
            provider: MockProvider::new(),
            counter: GenerationCounter::new(),
        })
    }

    /// Issue a fresh token and load a snapshot for `filter`.
    ///
    /// `Ok(None)` means the result came back stale (a newer refresh began
    /// while this one was in flight) and must be discarded.
    pub fn load(
        &self,
        roster: &[Account],
        filter: &FilterState,
    ) -> Result<Option<DashboardSnapshot>, DashboardError> {
        let generation = self.counter.begin();
        let snapshot = self
            .runtime
            .block_on(load_snapshot(&self.provider, roster, filter, generation))?;
        if self.counter.is_current(snapshot.generation) {
            Ok(Some(snapshot))
        } else {
            Ok(None)
        }
    }
}
