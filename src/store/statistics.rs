//! Dashboard and statistics cache.

#[cfg(test)]
#[path = "statistics_test.rs"]
mod statistics_test;

use tokio::sync::watch;

use super::{BusyState, LoadingGuard};
use crate::api::{ApiClient, ApiError, Envelope};
use crate::model::{DashboardData, Statistics};

/// Observable state of the [`StatisticsStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsState {
    pub dashboard: Option<DashboardData>,
    pub statistics: Option<Statistics>,
    pub loading: bool,
    /// Reason from the last `success:false` fetch; cleared by the next success.
    pub error: Option<String>,
    in_flight: usize,
}

impl BusyState for StatisticsState {
    fn in_flight(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

pub struct StatisticsStore {
    client: ApiClient,
    state: watch::Sender<StatisticsState>,
}

impl StatisticsStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(StatisticsState::default());
        Self { client, state }
    }

    #[must_use]
    pub fn snapshot(&self) -> StatisticsState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatisticsState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn dashboard(&self) -> Option<DashboardData> {
        self.state.borrow().dashboard.clone()
    }

    #[must_use]
    pub fn statistics(&self) -> Option<Statistics> {
        self.state.borrow().statistics.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Fetch the dashboard and replace `dashboard` on success.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn fetch_dashboard(&self) -> Result<Envelope<DashboardData>, ApiError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.client.dashboard().await.inspect_err(|error| {
            tracing::error!(%error, "dashboard fetch failed");
        })?;

        match (&envelope.data, envelope.success) {
            (Some(dashboard), true) => self.state.send_modify(|s| {
                s.dashboard = Some(dashboard.clone());
                s.error = None;
            }),
            (_, false) => self.record_failure(&envelope),
            (None, true) => {}
        }
        Ok(envelope)
    }

    /// Fetch the aggregate statistics alone.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn fetch_statistics(&self) -> Result<Envelope<Statistics>, ApiError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.client.statistics().await.inspect_err(|error| {
            tracing::error!(%error, "statistics fetch failed");
        })?;

        match (&envelope.data, envelope.success) {
            (Some(statistics), true) => self.state.send_modify(|s| {
                s.statistics = Some(statistics.clone());
                s.error = None;
            }),
            (_, false) => self.record_failure(&envelope),
            (None, true) => {}
        }
        Ok(envelope)
    }

    fn record_failure<T>(&self, envelope: &Envelope<T>) {
        let reason = envelope.failure_reason();
        tracing::warn!(%reason, "statistics fetch reported failure; keeping cached state");
        self.state.send_modify(|s| s.error = Some(reason));
    }
}
