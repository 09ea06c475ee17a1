//! Razor entity and its request payloads.

#[cfg(test)]
#[path = "razor_test.rs"]
mod razor_test;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, Identified, Validate, check_amount, check_optional_text, null_as_default, require_text};

/// A razor handle owned by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Razor {
    pub id: EntityId,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Razor {
    /// Display label, e.g. `"Merkur 34C"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

impl Identified for Razor {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// `POST /razors` body. Brand and model are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateRazorRequest {
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateRazorRequest {
    #[must_use]
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self { brand: brand.into(), model: model.into(), ..Self::default() }
    }
}

impl Validate for CreateRazorRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_text(&mut errors, "brand", &self.brand);
        require_text(&mut errors, "model", &self.model);
        check_amount(&mut errors, "price", self.price);
        errors
    }
}

/// `PUT /razors/{id}` body. Only supplied fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRazorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for UpdateRazorRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_optional_text(&mut errors, "brand", self.brand.as_deref());
        check_optional_text(&mut errors, "model", self.model.as_deref());
        check_amount(&mut errors, "price", self.price);
        errors
    }
}
