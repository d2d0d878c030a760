//! Record models
//!
//! All records serialize with camelCase keys and English status tokens.
//! Statuses written with the Russian labels of earlier builds are still
//! accepted when a collection is loaded.

pub mod dates;
mod customer;
mod field;
mod operator;
mod order;

pub use customer::{Customer, CustomerForm, CustomerStats};
pub use dates::{format_ru_date, parse_date};
pub use field::{Field, FieldForm, FieldStatus};
pub use operator::{Aircraft, FleetTotals, Operator, OperatorForm, OperatorStats, OperatorStatus};
pub use order::{Order, OrderQuery, OrderStatus};
