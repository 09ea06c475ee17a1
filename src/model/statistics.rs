//! Read-only aggregates computed by the backend.

use serde::{Deserialize, Serialize};

use super::{UsageRecord, null_as_default};

/// Number of records the backend includes in [`DashboardData::recent_records`].
pub const DASHBOARD_RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_usage: u64,
    #[serde(default)]
    pub razor_count: u64,
    #[serde(default)]
    pub blade_count: u64,
    /// Mean of rated records; 0 when nothing is rated.
    #[serde(default)]
    pub average_rating: f64,
}

/// Dashboard payload: statistics plus the most recent records, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_records: Vec<UsageRecord>,
}

/// `GET /health` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
