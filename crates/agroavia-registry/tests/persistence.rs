use agroavia_core::EventBus;
use agroavia_registry::{
    orders_csv, DeletePolicy, ExportBundle, FileStore, KeyValueStore, OrderStatus, Registry,
};
use agroavia_settings::StorageSettings;
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Registry {
    let store = FileStore::open(dir.path()).unwrap();
    Registry::open(
        Arc::new(store),
        &StorageSettings::default(),
        Arc::new(EventBus::new()),
    )
}

#[test]
fn test_collections_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let order_id = {
        let registry = open(&dir);
        registry.seed_demo();
        let order = registry.create_order("field_1", None).unwrap();
        registry
            .update_order_status(&order.id, OrderStatus::InProgress)
            .unwrap();
        order.id
    };

    for key in ["fields", "orders", "operators", "customers"] {
        assert!(dir.path().join(format!("agroaviatech-{key}.json")).exists());
    }

    let registry = open(&dir);
    assert_eq!(registry.fields().len(), 1);
    assert_eq!(registry.orders().len(), 2);
    assert_eq!(
        registry.order(&order_id).unwrap().status,
        OrderStatus::InProgress
    );
}

#[test]
fn test_malformed_collection_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("agroaviatech-fields", "{ broken").unwrap();
    store
        .set("agroaviatech-customers", r#"[{"id":"c1","name":"Нива"}]"#)
        .unwrap();

    let registry = open(&dir);
    assert!(registry.fields().is_empty());
    assert_eq!(registry.customer("c1").unwrap().name, "Нива");
}

#[test]
fn test_legacy_russian_statuses_load() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store
        .set(
            "agroaviatech-orders",
            r#"[{"id":"o1","fieldId":"f1","customerId":"c1","status":"в работе","createdAt":"2024-01-15T10:00:00Z"}]"#,
        )
        .unwrap();

    let registry = open(&dir);
    assert_eq!(
        registry.order("o1").unwrap().status,
        OrderStatus::InProgress
    );
}

#[test]
fn test_orphan_delete_keeps_dangling_orders() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir);
    registry.seed_demo();

    let removal = registry
        .delete_customer("customer_1", DeletePolicy::Orphan)
        .unwrap();
    assert_eq!(removal.dependents.describe(), "1 field, 1 order");

    let registry = open(&dir);
    assert_eq!(registry.fields_of("customer_1").len(), 1);
    assert_eq!(registry.orders_of("customer_1").len(), 1);
    assert!(registry.customer("customer_1").is_err());
}

#[test]
fn test_export_files() {
    let dir = TempDir::new().unwrap();
    let registry = open(&dir);
    registry.seed_demo();

    let bundle = ExportBundle::collect(&registry, "customer_1");
    let path = dir.path().join(bundle.file_name("customer_1"));
    bundle.write_to(&path).unwrap();

    let read: ExportBundle =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read.fields.len(), 1);
    assert_eq!(read.orders[0].id, "order_1");

    let csv = orders_csv(&registry.orders_of("customer_1"), &registry.fields().all()).unwrap();
    assert_eq!(csv.lines().count(), 2);
}
