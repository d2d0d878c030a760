//! Record registry
//!
//! Owns the four persisted collections and the operations that span them:
//! order creation from a field, operator assignment, statistics and
//! policy-driven deletes.

use agroavia_core::{generate_id, EventBus, RecordKind};
use agroavia_settings::StorageSettings;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::collection::{Collection, Record};
use crate::demo;
use crate::error::{RegistryError, RegistryResult};
use crate::model::{
    Customer, CustomerForm, CustomerStats, Field, Operator, OperatorForm, OperatorStats, Order,
    OrderQuery, OrderStatus,
};
use crate::relations::{DeletePolicy, Dependents, Removal};
use crate::storage::{KeyValueStore, MemoryStore};

/// Fields, orders, operators and customers
#[derive(Debug)]
pub struct Registry {
    fields: Collection<Field>,
    orders: Collection<Order>,
    operators: Collection<Operator>,
    customers: Collection<Customer>,
    bus: Arc<EventBus>,
}

impl Registry {
    /// Load every collection from `store` under the configured key prefix
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        storage: &StorageSettings,
        bus: Arc<EventBus>,
    ) -> Self {
        fn load<T: Record>(
            store: &Arc<dyn KeyValueStore>,
            storage: &StorageSettings,
            bus: &Arc<EventBus>,
        ) -> Collection<T> {
            Collection::open(storage.key(T::COLLECTION), store.clone(), bus.clone())
        }

        let registry = Self {
            fields: load(&store, storage, &bus),
            orders: load(&store, storage, &bus),
            operators: load(&store, storage, &bus),
            customers: load(&store, storage, &bus),
            bus,
        };
        tracing::info!(
            "Registry opened: {} fields, {} orders, {} operators, {} customers",
            registry.fields.len(),
            registry.orders.len(),
            registry.operators.len(),
            registry.customers.len()
        );
        registry
    }

    /// Registry over a fresh in-memory store
    pub fn in_memory(bus: Arc<EventBus>) -> Self {
        Self::open(
            Arc::new(MemoryStore::new()),
            &StorageSettings::default(),
            bus,
        )
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn fields(&self) -> &Collection<Field> {
        &self.fields
    }

    pub fn orders(&self) -> &Collection<Order> {
        &self.orders
    }

    pub fn operators(&self) -> &Collection<Operator> {
        &self.operators
    }

    pub fn customers(&self) -> &Collection<Customer> {
        &self.customers
    }

    /// Seed each empty collection with demonstration records.
    ///
    /// Returns the number of collections that were seeded.
    pub fn seed_demo(&self) -> usize {
        let now = Utc::now();
        let mut seeded = 0;
        if self.fields.is_empty() {
            self.fields.replace_all(demo::fields(now));
            seeded += 1;
        }
        if self.orders.is_empty() {
            self.orders.replace_all(demo::orders(now));
            seeded += 1;
        }
        if self.operators.is_empty() {
            self.operators.replace_all(demo::operators(now));
            seeded += 1;
        }
        if self.customers.is_empty() {
            self.customers.replace_all(demo::customers(now));
            seeded += 1;
        }
        if seeded > 0 {
            tracing::info!("Seeded {} collections with demo data", seeded);
        }
        seeded
    }

    // Fields

    pub fn field(&self, id: &str) -> RegistryResult<Field> {
        self.fields
            .get(id)
            .ok_or_else(|| RegistryError::not_found(RecordKind::Field, id))
    }

    /// Fields of one customer
    pub fn fields_of(&self, customer_id: &str) -> Vec<Field> {
        self.fields.filter(|f| f.customer_id == customer_id)
    }

    pub fn add_field(&self, field: Field) {
        tracing::info!("Field {} '{}' added ({} ha)", field.id, field.name, field.area);
        self.fields.insert(field);
    }

    /// Overwrite a field by id
    pub fn replace_field(&self, field: Field) -> RegistryResult<()> {
        let id = field.id.clone();
        self.fields.replace(field)?;
        tracing::info!("Field {} updated", id);
        Ok(())
    }

    pub fn delete_field(&self, id: &str, policy: DeletePolicy) -> RegistryResult<Removal<Field>> {
        let dependents = self.dependents_of(RecordKind::Field, id)?;
        self.check_policy(RecordKind::Field, id, &dependents, policy)?;

        let record = self.fields.remove(id)?;
        if policy == DeletePolicy::Cascade {
            self.orders.remove_where(|o| o.field_id == id);
        }
        tracing::info!("Field {} deleted ({}, {})", id, policy, dependents.describe());
        Ok(Removal {
            record,
            dependents,
            policy,
        })
    }

    // Orders

    pub fn order(&self, id: &str) -> RegistryResult<Order> {
        self.orders
            .get(id)
            .ok_or_else(|| RegistryError::not_found(RecordKind::Order, id))
    }

    /// Orders of one customer
    pub fn orders_of(&self, customer_id: &str) -> Vec<Order> {
        self.orders.filter(|o| o.customer_id == customer_id)
    }

    /// Orders matching a query, in insertion order.
    ///
    /// The term is matched against the current field name and crop, falling
    /// back to the snapshot on the order when the field is gone.
    pub fn search_orders(&self, query: &OrderQuery) -> Vec<Order> {
        let fields = self.fields.all();
        self.orders.filter(|order| {
            if let Some(customer_id) = &query.customer_id {
                if &order.customer_id != customer_id {
                    return false;
                }
            }
            if let Some(status) = query.status {
                if order.status != status {
                    return false;
                }
            }
            match &query.term {
                Some(term) => {
                    let field = fields.iter().find(|f| f.id == order.field_id);
                    order.matches_term(field, term)
                }
                None => true,
            }
        })
    }

    /// Order counts per status for one customer, or for all when `None`
    pub fn orders_by_status(&self, customer_id: Option<&str>) -> BTreeMap<OrderStatus, usize> {
        let mut counts = BTreeMap::new();
        for order in self
            .orders
            .filter(|o| customer_id.map_or(true, |c| o.customer_id == c))
        {
            *counts.entry(order.status).or_insert(0) += 1;
        }
        counts
    }

    /// Place a new order for a field.
    ///
    /// The order belongs to `customer_id` when given, otherwise to the
    /// field's customer.
    pub fn create_order(&self, field_id: &str, customer_id: Option<&str>) -> RegistryResult<Order> {
        let field = self.field(field_id)?;
        let customer_id = customer_id.unwrap_or(&field.customer_id).to_string();
        let order = Order::for_field(generate_id(), &field, &customer_id, Utc::now());
        tracing::info!("Order {} created for field {}", order.id, field_id);
        self.orders.insert(order.clone());
        Ok(order)
    }

    pub fn update_order_status(&self, id: &str, status: OrderStatus) -> RegistryResult<Order> {
        let now = Utc::now();
        let order = self.orders.update(id, |o| o.set_status(status, now))?;
        tracing::info!("Order {} is now {}", id, status);
        Ok(order)
    }

    /// Assign an existing operator to an order
    pub fn assign_operator(&self, order_id: &str, operator_id: &str) -> RegistryResult<Order> {
        if !self.operators.contains(operator_id) {
            return Err(RegistryError::not_found(RecordKind::Operator, operator_id));
        }
        let now = Utc::now();
        let order = self.orders.update(order_id, |o| {
            o.operator_id = Some(operator_id.to_string());
            o.assigned_at = Some(now);
            o.updated_at = Some(now);
        })?;
        tracing::info!("Operator {} assigned to order {}", operator_id, order_id);
        Ok(order)
    }

    pub fn delete_order(&self, id: &str) -> RegistryResult<Order> {
        let order = self.orders.remove(id)?;
        tracing::info!("Order {} deleted", id);
        Ok(order)
    }

    // Operators

    pub fn operator(&self, id: &str) -> RegistryResult<Operator> {
        self.operators
            .get(id)
            .ok_or_else(|| RegistryError::not_found(RecordKind::Operator, id))
    }

    /// Create an operator, or overwrite `editing` keeping its id and creation time
    pub fn save_operator(
        &self,
        form: &OperatorForm,
        editing: Option<&str>,
    ) -> RegistryResult<Operator> {
        form.validate()?;
        let now = Utc::now();
        let aircrafts = form.normalized_fleet();

        let operator = match editing {
            Some(id) => self.operators.update(id, |op| {
                op.name = form.name.trim().to_string();
                op.pilot = form.pilot.clone();
                op.phone = form.phone.clone();
                op.status = form.status;
                op.notes = form.notes.clone();
                op.aircrafts = aircrafts;
                op.updated_at = now;
            })?,
            None => {
                let operator = Operator {
                    id: generate_id(),
                    name: form.name.trim().to_string(),
                    pilot: form.pilot.clone(),
                    phone: form.phone.clone(),
                    status: form.status,
                    notes: form.notes.clone(),
                    aircrafts,
                    created_at: now,
                    updated_at: now,
                };
                self.operators.insert(operator.clone());
                operator
            }
        };
        tracing::info!(
            "Operator {} '{}' saved with {} aircraft",
            operator.id,
            operator.name,
            operator.total_aircraft()
        );
        Ok(operator)
    }

    /// Delete an operator; cascading unassigns its orders
    pub fn delete_operator(
        &self,
        id: &str,
        policy: DeletePolicy,
    ) -> RegistryResult<Removal<Operator>> {
        let dependents = self.dependents_of(RecordKind::Operator, id)?;
        self.check_policy(RecordKind::Operator, id, &dependents, policy)?;

        let record = self.operators.remove(id)?;
        if policy == DeletePolicy::Cascade {
            let now = Utc::now();
            self.orders.update_where(
                |o| o.operator_id.as_deref() == Some(id),
                |o| {
                    o.operator_id = None;
                    o.assigned_at = None;
                    o.updated_at = Some(now);
                },
            );
        }
        tracing::info!("Operator {} deleted ({}, {})", id, policy, dependents.describe());
        Ok(Removal {
            record,
            dependents,
            policy,
        })
    }

    pub fn operator_stats(&self, id: &str) -> RegistryResult<OperatorStats> {
        let operator = self.operator(id)?;
        let orders = self.orders.filter(|o| o.operator_id.as_deref() == Some(id));
        Ok(OperatorStats {
            total_orders: orders.len(),
            completed_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed)
                .count(),
            active_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::InProgress)
                .count(),
            total_aircraft: operator.total_aircraft(),
            aircraft_types: operator.aircrafts.len(),
        })
    }

    // Customers

    pub fn customer(&self, id: &str) -> RegistryResult<Customer> {
        self.customers
            .get(id)
            .ok_or_else(|| RegistryError::not_found(RecordKind::Customer, id))
    }

    /// Create a customer, or overwrite `editing` keeping its id and creation time
    pub fn save_customer(
        &self,
        form: &CustomerForm,
        editing: Option<&str>,
    ) -> RegistryResult<Customer> {
        form.validate()?;
        let now = Utc::now();

        let customer = match editing {
            Some(id) => self.customers.update(id, |c| {
                c.name = form.name.trim().to_string();
                c.contact = form.contact.clone();
                c.address = form.address.clone();
                c.phone = form.phone.clone();
                c.email = form.email.clone();
                c.notes = form.notes.clone();
                c.updated_at = now;
            })?,
            None => {
                let customer = Customer {
                    id: generate_id(),
                    name: form.name.trim().to_string(),
                    contact: form.contact.clone(),
                    address: form.address.clone(),
                    phone: form.phone.clone(),
                    email: form.email.clone(),
                    notes: form.notes.clone(),
                    created_at: now,
                    updated_at: now,
                };
                self.customers.insert(customer.clone());
                customer
            }
        };
        tracing::info!("Customer {} '{}' saved", customer.id, customer.name);
        Ok(customer)
    }

    /// Delete a customer; cascading removes its fields and their orders
    pub fn delete_customer(
        &self,
        id: &str,
        policy: DeletePolicy,
    ) -> RegistryResult<Removal<Customer>> {
        let dependents = self.dependents_of(RecordKind::Customer, id)?;
        self.check_policy(RecordKind::Customer, id, &dependents, policy)?;

        let record = self.customers.remove(id)?;
        if policy == DeletePolicy::Cascade {
            let removed: HashSet<String> = self
                .fields
                .remove_where(|f| f.customer_id == id)
                .into_iter()
                .map(|f| f.id)
                .collect();
            self.orders
                .remove_where(|o| o.customer_id == id || removed.contains(&o.field_id));
        }
        tracing::info!("Customer {} deleted ({}, {})", id, policy, dependents.describe());
        Ok(Removal {
            record,
            dependents,
            policy,
        })
    }

    pub fn customer_stats(&self, customer_id: &str) -> CustomerStats {
        let fields = self.fields_of(customer_id);
        let orders = self.orders_of(customer_id);
        CustomerStats {
            total_fields: fields.len(),
            total_area: fields.iter().map(|f| f.area).sum(),
            total_orders: orders.len(),
            active_orders: orders.iter().filter(|o| o.status.is_active()).count(),
        }
    }

    // Relations

    /// Records referencing `kind`/`id`
    pub fn dependents_of(&self, kind: RecordKind, id: &str) -> RegistryResult<Dependents> {
        let exists = match kind {
            RecordKind::Field => self.fields.contains(id),
            RecordKind::Order => self.orders.contains(id),
            RecordKind::Operator => self.operators.contains(id),
            RecordKind::Customer => self.customers.contains(id),
        };
        if !exists {
            return Err(RegistryError::not_found(kind, id));
        }

        let order_ids = |orders: Vec<Order>| orders.into_iter().map(|o| o.id).collect();
        let dependents = match kind {
            RecordKind::Field => Dependents {
                fields: Vec::new(),
                orders: order_ids(self.orders.filter(|o| o.field_id == id)),
            },
            RecordKind::Order => Dependents::default(),
            RecordKind::Operator => Dependents {
                fields: Vec::new(),
                orders: order_ids(self.orders.filter(|o| o.operator_id.as_deref() == Some(id))),
            },
            RecordKind::Customer => {
                let fields: Vec<String> = self
                    .fields
                    .filter(|f| f.customer_id == id)
                    .into_iter()
                    .map(|f| f.id)
                    .collect();
                // Orders placed by the customer or against one of its fields
                let orders = order_ids(
                    self.orders
                        .filter(|o| o.customer_id == id || fields.contains(&o.field_id)),
                );
                Dependents { fields, orders }
            }
        };
        Ok(dependents)
    }

    fn check_policy(
        &self,
        kind: RecordKind,
        id: &str,
        dependents: &Dependents,
        policy: DeletePolicy,
    ) -> RegistryResult<()> {
        if policy == DeletePolicy::Block && !dependents.is_empty() {
            tracing::warn!("Delete of {} {} blocked by {}", kind, id, dependents.describe());
            return Err(RegistryError::DeleteBlocked {
                kind,
                id: id.to_string(),
                dependents: dependents.describe(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Aircraft;

    fn seeded() -> Registry {
        let registry = Registry::in_memory(Arc::new(EventBus::new()));
        assert_eq!(registry.seed_demo(), 4);
        registry
    }

    #[test]
    fn test_seed_only_fills_empty_collections() {
        let registry = Registry::in_memory(Arc::new(EventBus::new()));
        registry
            .save_customer(
                &CustomerForm {
                    name: "Своя компания".to_string(),
                    ..CustomerForm::default()
                },
                None,
            )
            .unwrap();

        assert_eq!(registry.seed_demo(), 3);
        assert_eq!(registry.customers().len(), 1);
        assert_eq!(registry.fields().len(), 1);
        assert_eq!(registry.seed_demo(), 0);
    }

    #[test]
    fn test_create_order_snapshots_field() {
        let registry = seeded();
        let order = registry.create_order("field_1", None).unwrap();
        assert_eq!(order.customer_id, "customer_1");
        assert_eq!(order.field_name, "Поле №1");
        assert_eq!(order.area, 45.2);
        assert_eq!(order.status, OrderStatus::New);

        assert!(matches!(
            registry.create_order("missing", None),
            Err(RegistryError::NotFound { kind: RecordKind::Field, .. })
        ));
    }

    #[test]
    fn test_assign_operator_requires_existing_operator() {
        let registry = seeded();
        let order = registry.create_order("field_1", None).unwrap();

        assert!(registry.assign_operator(&order.id, "ghost").is_err());
        let order = registry.assign_operator(&order.id, "operator_2").unwrap();
        assert_eq!(order.operator_id.as_deref(), Some("operator_2"));
        assert!(order.assigned_at.is_some());
    }

    #[test]
    fn test_search_and_group_orders() {
        let registry = seeded();
        let order = registry.create_order("field_1", None).unwrap();
        registry
            .update_order_status(&order.id, OrderStatus::InProgress)
            .unwrap();

        let query = OrderQuery {
            status: Some(OrderStatus::InProgress),
            term: Some("ПОЛЕ".to_string()),
            ..OrderQuery::default()
        };
        let found = registry.search_orders(&query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, order.id);

        let counts = registry.orders_by_status(Some("customer_1"));
        assert_eq!(counts.get(&OrderStatus::Completed), Some(&1));
        assert_eq!(counts.get(&OrderStatus::InProgress), Some(&1));
        assert!(registry.orders_by_status(Some("customer_2")).is_empty());
    }

    #[test]
    fn test_save_operator_edit_preserves_identity() {
        let registry = seeded();
        let before = registry.operator("operator_1").unwrap();
        let mut form = OperatorForm {
            name: "Авиапарк №1 (юг)".to_string(),
            ..OperatorForm::default()
        };
        form.aircrafts = vec![Aircraft {
            kind: "Ан-2".to_string(),
            count: 0,
            ..Aircraft::default()
        }];

        let saved = registry.save_operator(&form, Some("operator_1")).unwrap();
        assert_eq!(saved.id, "operator_1");
        assert_eq!(saved.created_at, before.created_at);
        assert_eq!(saved.aircrafts[0].count, 1);
        assert!(!saved.aircrafts[0].id.is_empty());

        form.name.clear();
        assert!(matches!(
            registry.save_operator(&form, None),
            Err(RegistryError::Validation(_))
        ));
        assert_eq!(registry.operators().len(), 2);
    }

    #[test]
    fn test_operator_stats() {
        let registry = seeded();
        let stats = registry.operator_stats("operator_1").unwrap();
        assert_eq!(stats.total_orders, 1);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.active_orders, 0);
        assert_eq!(stats.total_aircraft, 2);
        assert_eq!(stats.aircraft_types, 2);
    }

    #[test]
    fn test_customer_stats() {
        let registry = seeded();
        let order = registry.create_order("field_1", None).unwrap();
        registry
            .update_order_status(&order.id, OrderStatus::AwaitingConfirmation)
            .unwrap();

        let stats = registry.customer_stats("customer_1");
        assert_eq!(stats.total_fields, 1);
        assert_eq!(stats.total_area, 45.2);
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.active_orders, 1);
        assert_eq!(registry.customer_stats("customer_2"), CustomerStats::default());
    }

    #[test]
    fn test_delete_field_policies() {
        let registry = seeded();

        let err = registry
            .delete_field("field_1", DeletePolicy::Block)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DeleteBlocked { .. }));
        assert_eq!(registry.fields().len(), 1);

        let removal = registry
            .delete_field("field_1", DeletePolicy::Cascade)
            .unwrap();
        assert_eq!(removal.dependents.orders, ["order_1"]);
        assert!(registry.fields().is_empty());
        assert!(registry.orders().is_empty());
    }

    #[test]
    fn test_delete_operator_orphan_and_cascade() {
        let registry = seeded();
        registry
            .delete_operator("operator_1", DeletePolicy::Orphan)
            .unwrap();
        assert_eq!(
            registry.order("order_1").unwrap().operator_id.as_deref(),
            Some("operator_1")
        );

        registry
            .delete_operator("operator_2", DeletePolicy::Cascade)
            .unwrap();
        registry.assign_operator("order_1", "operator_2").unwrap_err();
    }

    #[test]
    fn test_delete_operator_cascade_unassigns() {
        let registry = seeded();
        registry
            .delete_operator("operator_1", DeletePolicy::Cascade)
            .unwrap();
        let order = registry.order("order_1").unwrap();
        assert!(order.operator_id.is_none());
        assert!(order.assigned_at.is_none());
    }

    #[test]
    fn test_delete_customer_cascade() {
        let registry = seeded();
        let deps = registry
            .dependents_of(RecordKind::Customer, "customer_1")
            .unwrap();
        assert_eq!(deps.describe(), "1 field, 1 order");

        registry
            .delete_customer("customer_1", DeletePolicy::Cascade)
            .unwrap();
        assert!(registry.fields().is_empty());
        assert!(registry.orders().is_empty());
        assert_eq!(registry.customers().len(), 1);

        assert!(matches!(
            registry.dependents_of(RecordKind::Customer, "customer_1"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_customer_dependents_include_orders_on_its_fields() {
        let registry = seeded();
        let foreign = registry
            .create_order("field_1", Some("customer_2"))
            .unwrap();
        assert_eq!(foreign.customer_id, "customer_2");

        let deps = registry
            .dependents_of(RecordKind::Customer, "customer_1")
            .unwrap();
        assert_eq!(deps.orders, ["order_1".to_string(), foreign.id.clone()]);
        assert_eq!(deps.describe(), "1 field, 2 orders");

        let removal = registry
            .delete_customer("customer_1", DeletePolicy::Cascade)
            .unwrap();
        assert_eq!(removal.dependents, deps);
        assert!(registry.order(&foreign.id).is_err());
        assert!(registry.orders().is_empty());
    }
}
