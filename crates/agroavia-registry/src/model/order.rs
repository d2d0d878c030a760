use agroavia_core::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::dates;
use super::field::Field;

/// Lifecycle of a service order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "новая")]
    New,
    #[serde(alias = "ожидает подтверждения")]
    AwaitingConfirmation,
    #[serde(alias = "в работе")]
    InProgress,
    #[serde(alias = "выполнено")]
    Completed,
    #[serde(alias = "отменено")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::New,
        Self::AwaitingConfirmation,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Label shown in the Russian interface
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "новая",
            Self::AwaitingConfirmation => "ожидает подтверждения",
            Self::InProgress => "в работе",
            Self::Completed => "выполнено",
            Self::Cancelled => "отменено",
        }
    }

    /// Counted as active work for a customer
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::AwaitingConfirmation)
    }

    fn token(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OrderStatus {
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
            .ok_or_else(|| ValidationError::invalid("status", format!("unknown order status '{s}'")))
    }
}

/// A service order placed against a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub field_id: String,
    #[serde(default)]
    pub customer_id: String,
    /// Copied from the field when the order was placed
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub price: f64,
    #[serde(default, deserialize_with = "dates::lenient")]
    pub processing_date: Option<NaiveDate>,
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// New unassigned order snapshotting the field's attributes
    pub fn for_field(id: String, field: &Field, customer_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            field_id: field.id.clone(),
            customer_id: customer_id.to_string(),
            field_name: field.name.clone(),
            area: field.area,
            crop: field.crop.clone(),
            status: OrderStatus::New,
            price: field.price,
            processing_date: field.processing_date,
            operator_id: None,
            notes: String::new(),
            created_at: now,
            updated_at: None,
            assigned_at: None,
            completed_at: None,
        }
    }

    /// Change the status; the first transition to completed is timestamped
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
        if status == OrderStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    /// Case-insensitive match on field name, crop or order id
    pub fn matches_term(&self, field: Option<&Field>, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let (name, crop) = match field {
            Some(field) => (field.name.as_str(), field.crop.as_str()),
            None => (self.field_name.as_str(), self.crop.as_str()),
        };
        name.to_lowercase().contains(&term)
            || crop.to_lowercase().contains(&term)
            || self.id.to_lowercase().contains(&term)
    }
}

/// Filter for listing orders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    /// Only orders of this customer
    pub customer_id: Option<String>,
    /// Only orders in this status
    pub status: Option<OrderStatus>,
    /// Free-text term over field name, crop and order id
    pub term: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn order() -> Order {
        let field = Field {
            id: "f1".to_string(),
            name: "Северное".to_string(),
            crop: "ячмень".to_string(),
            area: 12.5,
            price: 900.0,
            region: String::new(),
            owner: String::new(),
            customer_id: "c1".to_string(),
            processing_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            status: Default::default(),
            coordinates: Vec::new(),
            center: agroavia_core::DEFAULT_CENTER,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        Order::for_field("order-abc".to_string(), &field, "c1", Utc::now())
    }

    #[test]
    fn test_for_field_copies_snapshot() {
        let order = order();
        assert_eq!(order.field_name, "Северное");
        assert_eq!(order.area, 12.5);
        assert_eq!(order.price, 900.0);
        assert_eq!(order.status, OrderStatus::New);
        assert!(order.operator_id.is_none());
        assert!(order.notes.is_empty());
    }

    #[test]
    fn test_completed_at_is_set_once() {
        let mut order = order();
        let first = Utc::now();
        order.set_status(OrderStatus::Completed, first);
        assert_eq!(order.completed_at, Some(first));

        let later = first + Duration::hours(1);
        order.set_status(OrderStatus::InProgress, later);
        order.set_status(OrderStatus::Completed, later);
        assert_eq!(order.completed_at, Some(first));
        assert_eq!(order.updated_at, Some(later));
    }

    #[test]
    fn test_matches_term() {
        let order = order();
        assert!(order.matches_term(None, "север"));
        assert!(order.matches_term(None, "ЯЧМ"));
        assert!(order.matches_term(None, "abc"));
        assert!(order.matches_term(None, ""));
        assert!(!order.matches_term(None, "пшеница"));
    }

    #[test]
    fn test_status_labels() {
        let status: OrderStatus = serde_json::from_str("\"ожидает подтверждения\"").unwrap();
        assert_eq!(status, OrderStatus::AwaitingConfirmation);
        assert!(status.is_active());
        assert!(!OrderStatus::New.is_active());
        assert_eq!("выполнено".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
    }
}
