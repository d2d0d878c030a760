use agroavia_core::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer owning fields and placing orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Editable attributes of a customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerForm {
    pub name: String,
    pub contact: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

impl CustomerForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        Ok(())
    }
}

/// Per-customer summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total_fields: usize,
    pub total_area: f64,
    pub total_orders: usize,
    /// Orders in progress or awaiting confirmation
    pub active_orders: usize,
}
