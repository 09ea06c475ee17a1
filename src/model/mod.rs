//! Wire model for the tracker backend.
//!
//! DESIGN
//! ======
//! Entities mirror the backend JSON one-to-one and are only ever cached
//! copies. Mutation payloads are split per entity into create/update shapes;
//! update shapes skip absent fields so the backend only touches what the
//! caller supplied.

pub mod blade;
pub mod page;
pub mod razor;
pub mod statistics;
pub mod usage_record;

use serde::{Deserialize, Deserializer};

pub use blade::{Blade, CreateBladeRequest, UpdateBladeRequest};
pub use page::{Page, PageParams, total_pages};
pub use razor::{CreateRazorRequest, Razor, UpdateRazorRequest};
pub use statistics::{DashboardData, HealthStatus, Statistics};
pub use usage_record::{CreateUsageRecordRequest, UpdateUsageRecordRequest, UsageRecord};

/// Server-assigned primary key. Always positive for persisted entities.
pub type EntityId = u64;

/// Entities that carry a server-assigned id.
pub trait Identified {
    fn id(&self) -> EntityId;
}

/// Client-side shape checks for request payloads.
pub trait Validate {
    /// Returns an empty `Vec` if valid; otherwise a list of human-readable errors.
    fn validate(&self) -> Vec<String>;
}

/// Decode JSON `null` as the type's default (the backend emits `null` for
/// empty slices and unset strings).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn require_text(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} must not be empty"));
    }
}

pub(crate) fn check_optional_text(errors: &mut Vec<String>, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        require_text(errors, field, value);
    }
}

pub(crate) fn check_amount(errors: &mut Vec<String>, field: &str, value: Option<f64>) {
    if let Some(value) = value {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{field} must be a non-negative number"));
        }
    }
}

pub(crate) fn check_id(errors: &mut Vec<String>, field: &str, value: Option<EntityId>) {
    if value == Some(0) {
        errors.push(format!("{field} must be a positive id"));
    }
}
