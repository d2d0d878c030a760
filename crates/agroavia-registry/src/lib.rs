//! AgroAviaTech Record Registry
//!
//! Field, order, operator and customer records, their persistence in a
//! key-value store, relation-aware deletes, statistics and export.

pub mod collection;
pub mod demo;
pub mod error;
pub mod export;
pub mod model;
pub mod registry;
pub mod relations;
pub mod storage;

pub use collection::{Collection, Record};
pub use error::{RegistryError, RegistryResult};
pub use export::{export_file_name, orders_csv, ExportBundle};
pub use model::{
    Aircraft, Customer, CustomerForm, CustomerStats, Field, FieldForm, FieldStatus, FleetTotals,
    Operator, OperatorForm, OperatorStats, OperatorStatus, Order, OrderQuery, OrderStatus,
};
pub use registry::Registry;
pub use relations::{DeletePolicy, Dependents, Removal};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
