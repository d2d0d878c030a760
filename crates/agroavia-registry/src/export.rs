//! JSON and CSV export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RegistryResult;
use crate::model::{format_ru_date, Customer, Field, Operator, Order};
use crate::registry::Registry;

/// Snapshot of one customer's workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    /// Fields of the exported customer
    pub fields: Vec<Field>,
    /// Orders of the exported customer
    pub orders: Vec<Order>,
    /// All operators
    pub operators: Vec<Operator>,
    /// All customers
    pub customers: Vec<Customer>,
    pub export_date: DateTime<Utc>,
}

impl ExportBundle {
    /// Collect the bundle for `customer_id`
    pub fn collect(registry: &Registry, customer_id: &str) -> Self {
        Self {
            fields: registry.fields_of(customer_id),
            orders: registry.orders_of(customer_id),
            operators: registry.operators().all(),
            customers: registry.customers().all(),
            export_date: Utc::now(),
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document to `path`
    pub fn write_to(&self, path: &Path) -> RegistryResult<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(
            "Exported {} fields and {} orders to {}",
            self.fields.len(),
            self.orders.len(),
            path.display()
        );
        Ok(())
    }

    /// Suggested download name for this bundle
    pub fn file_name(&self, customer_id: &str) -> String {
        export_file_name(customer_id, self.export_date.timestamp_millis())
    }
}

/// `agroaviatech_export_<customer>_<unix-millis>.json`
pub fn export_file_name(customer_id: &str, millis: i64) -> String {
    format!("agroaviatech_export_{customer_id}_{millis}.json")
}

/// Render orders as CSV with every cell quoted.
///
/// Field name, crop and area are taken from the referenced field and left
/// empty when it no longer exists.
pub fn orders_csv(orders: &[Order], fields: &[Field]) -> RegistryResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(["ID", "Field", "Crop", "Area", "Created", "Status", "Price"])?;
    for order in orders {
        let field = fields.iter().find(|f| f.id == order.field_id);
        let (name, crop, area) = match field {
            Some(field) => (field.name.clone(), field.crop.clone(), field.area.to_string()),
            None => (String::new(), String::new(), String::new()),
        };
        writer.write_record([
            order.id.clone(),
            name,
            crop,
            area,
            format_ru_date(&order.created_at),
            order.status.to_string(),
            order.price.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
