//! Blade entity and its request payloads.
//!
//! `compatible_razors` travels as a string holding a JSON array of razor ids;
//! the backend stores it verbatim.

#[cfg(test)]
#[path = "blade_test.rs"]
mod blade_test;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    EntityId, Identified, Validate, check_amount, check_optional_text, null_as_default, require_text,
};

/// A pack of blades. Stock counts are maintained by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blade {
    pub id: EntityId,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub compatible_razors: String,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub total_quantity: i64,
    #[serde(default)]
    pub remaining_quantity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Blade {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// Razor ids this blade fits. Blank or malformed values yield an empty list.
    #[must_use]
    pub fn compatible_razor_ids(&self) -> Vec<EntityId> {
        parse_compatible_razors(&self.compatible_razors)
    }
}

impl Identified for Blade {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Parse the stored `compatible_razors` string.
#[must_use]
pub fn parse_compatible_razors(raw: &str) -> Vec<EntityId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Vec<EntityId>>(trimmed).unwrap_or_default()
}

/// Encode razor ids into the stored `compatible_razors` representation.
#[must_use]
pub fn encode_compatible_razors(ids: &[EntityId]) -> String {
    let parts: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(","))
}

/// `POST /blades` body. Brand and model are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateBladeRequest {
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_razors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateBladeRequest {
    #[must_use]
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self { brand: brand.into(), model: model.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_compatible_razors(mut self, ids: &[EntityId]) -> Self {
        self.compatible_razors = Some(encode_compatible_razors(ids));
        self
    }
}

impl Validate for CreateBladeRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_text(&mut errors, "brand", &self.brand);
        require_text(&mut errors, "model", &self.model);
        check_amount(&mut errors, "unit_price", self.unit_price);
        check_quantity(&mut errors, "total_quantity", self.total_quantity);
        check_quantity(&mut errors, "remaining_quantity", self.remaining_quantity);
        errors
    }
}

/// `PUT /blades/{id}` body. Only supplied fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBladeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_razors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for UpdateBladeRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_optional_text(&mut errors, "brand", self.brand.as_deref());
        check_optional_text(&mut errors, "model", self.model.as_deref());
        check_amount(&mut errors, "unit_price", self.unit_price);
        check_quantity(&mut errors, "total_quantity", self.total_quantity);
        check_quantity(&mut errors, "remaining_quantity", self.remaining_quantity);
        errors
    }
}

fn check_quantity(errors: &mut Vec<String>, field: &str, value: Option<i64>) {
    if value.is_some_and(|v| v < 0) {
        errors.push(format!("{field} must not be negative"));
    }
}
