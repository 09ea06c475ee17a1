//! Per-shave usage log entries.

#[cfg(test)]
#[path = "usage_record_test.rs"]
mod usage_record_test;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Blade, EntityId, Identified, Razor, Validate, check_id, null_as_default};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One shave: which razor and blade were used, and how it went.
///
/// `razor` and `blade` are embedded by the backend; they decode to defaults
/// when the backend omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: EntityId,
    pub usage_time: DateTime<Utc>,
    pub razor_id: EntityId,
    pub blade_id: EntityId,
    #[serde(default = "default_blade_usage_count")]
    pub blade_usage_count: u32,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience_text: String,
    #[serde(default)]
    pub need_blade_change: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub razor: Razor,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blade: Blade,
}

fn default_blade_usage_count() -> u32 {
    1
}

impl Identified for UsageRecord {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// `POST /usage-records` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUsageRecordRequest {
    pub usage_time: DateTime<Utc>,
    pub razor_id: EntityId,
    pub blade_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blade_usage_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_blade_change: Option<bool>,
}

impl CreateUsageRecordRequest {
    #[must_use]
    pub fn new(usage_time: DateTime<Utc>, razor_id: EntityId, blade_id: EntityId) -> Self {
        Self {
            usage_time,
            razor_id,
            blade_id,
            blade_usage_count: None,
            rating: None,
            experience_text: None,
            need_blade_change: None,
        }
    }
}

impl Validate for CreateUsageRecordRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_id(&mut errors, "razor_id", Some(self.razor_id));
        check_id(&mut errors, "blade_id", Some(self.blade_id));
        check_rating(&mut errors, self.rating);
        errors
    }
}

/// `PUT /usage-records/{id}` body. Only supplied fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUsageRecordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razor_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blade_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blade_usage_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_blade_change: Option<bool>,
}

impl Validate for UpdateUsageRecordRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_id(&mut errors, "razor_id", self.razor_id);
        check_id(&mut errors, "blade_id", self.blade_id);
        check_rating(&mut errors, self.rating);
        errors
    }
}

fn check_rating(errors: &mut Vec<String>, rating: Option<u8>) {
    if rating.is_some_and(|r| !(MIN_RATING..=MAX_RATING).contains(&r)) {
        errors.push(format!("rating must be between {MIN_RATING} and {MAX_RATING}"));
    }
}
