//! Application context shared by every screen.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`AppContext`] is built at startup and handed to whatever drives the
//! screens (the CLI today). It owns the single [`ApiClient`] and one store per
//! resource; there is no global state and no lazy singletons.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::store::{BladeStore, RazorStore, StatisticsStore, UsageRecordStore};

/// Cheap to clone; clones share the same stores.
#[derive(Clone)]
pub struct AppContext {
    pub client: ApiClient,
    pub razors: Arc<RazorStore>,
    pub blades: Arc<BladeStore>,
    pub usage_records: Arc<UsageRecordStore>,
    pub statistics: Arc<StatisticsStore>,
}

impl AppContext {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            razors: Arc::new(RazorStore::new(client.razors())),
            blades: Arc::new(BladeStore::new(client.blades())),
            usage_records: Arc::new(UsageRecordStore::new(client.usage_records())),
            statistics: Arc::new(StatisticsStore::new(client.clone())),
            client,
        }
    }

    /// Build a context over the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = ApiClient::from_config(config)?;
        tracing::info!(base_url = %config.base_url, "tracker context ready");
        Ok(Self::new(client))
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
