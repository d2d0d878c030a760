use agroavia_core::geo::{Vertex, DEFAULT_CENTER};
use agroavia_core::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::dates;

/// Processing lifecycle of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    #[default]
    #[serde(alias = "ожидает")]
    Pending,
    #[serde(alias = "в работе")]
    InProgress,
    #[serde(alias = "обработано")]
    Processed,
    #[serde(alias = "отменено")]
    Cancelled,
}

impl FieldStatus {
    pub const ALL: [FieldStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Processed,
        Self::Cancelled,
    ];

    /// Label shown in the Russian interface
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "ожидает",
            Self::InProgress => "в работе",
            Self::Processed => "обработано",
            Self::Cancelled => "отменено",
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Processed => "processed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FieldStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| {
                status.token().eq_ignore_ascii_case(s)
                    || status.token().replace('_', "-").eq_ignore_ascii_case(s)
                    || status.label() == s
            })
            .ok_or_else(|| ValidationError::invalid("status", format!("unknown field status '{s}'")))
    }
}

/// A registered field with its outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub crop: String,
    /// Hectares, computed from the outline or overridden on edit
    #[serde(default)]
    pub area: f64,
    /// Price per hectare
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub owner: String,
    /// Not checked against the customer collection
    #[serde(default)]
    pub customer_id: String,
    #[serde(default, deserialize_with = "dates::lenient")]
    pub processing_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: FieldStatus,
    /// Closed outline: first vertex equals last
    #[serde(default)]
    pub coordinates: Vec<Vertex>,
    #[serde(default = "default_center")]
    pub center: Vertex,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

fn default_center() -> Vertex {
    DEFAULT_CENTER
}

/// Editable attributes of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldForm {
    pub name: String,
    pub crop: String,
    /// Live area of the drawing, or the user's override on edit
    pub area: f64,
    pub price: f64,
    pub region: String,
    pub owner: String,
    pub customer_id: String,
    pub processing_date: Option<NaiveDate>,
    pub status: FieldStatus,
}

impl Default for FieldForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            crop: "пшеница".to_string(),
            area: 0.0,
            price: 1000.0,
            region: "Московская область".to_string(),
            owner: String::new(),
            customer_id: String::new(),
            processing_date: None,
            status: FieldStatus::Pending,
        }
    }
}

impl FieldForm {
    /// Pre-fill the form from an existing field for editing
    pub fn from_field(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            crop: field.crop.clone(),
            area: field.area,
            price: field.price,
            region: field.region.clone(),
            owner: field.owner.clone(),
            customer_id: field.customer_id.clone(),
            processing_date: field.processing_date,
            status: field.status,
        }
    }

    /// Check required attributes before anything is mutated
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::invalid(
                "price",
                "must be a non-negative number",
            ));
        }
        if !self.area.is_finite() || self.area < 0.0 {
            return Err(ValidationError::invalid(
                "area",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }
}
