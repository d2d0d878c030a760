//! Persisted record collections
//!
//! A collection is read once when opened and rewritten in full after every
//! mutation. The in-memory copy is authoritative: a failed write is logged
//! and published on the event bus, and the mutation still stands.

use agroavia_core::{
    AppEvent, EventBus, RecordAction, RecordEvent, RecordKind, StorageError, StorageEvent,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::model::{Customer, Field, Operator, Order};
use crate::storage::KeyValueStore;

/// A record stored in a [`Collection`]
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind reported in events and errors
    const KIND: RecordKind;
    /// Collection name, the suffix of the storage key
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

impl Record for Field {
    const KIND: RecordKind = RecordKind::Field;
    const COLLECTION: &'static str = "fields";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Order {
    const KIND: RecordKind = RecordKind::Order;
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Operator {
    const KIND: RecordKind = RecordKind::Operator;
    const COLLECTION: &'static str = "operators";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Customer {
    const KIND: RecordKind = RecordKind::Customer;
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered, persisted list of records of one kind
pub struct Collection<T: Record> {
    key: String,
    items: RwLock<Vec<T>>,
    store: Arc<dyn KeyValueStore>,
    bus: Arc<EventBus>,
}

impl<T: Record> Collection<T> {
    /// Load the collection stored under `key`.
    ///
    /// An absent, unreadable or malformed document yields an empty collection.
    pub fn open(key: impl Into<String>, store: Arc<dyn KeyValueStore>, bus: Arc<EventBus>) -> Self {
        let key = key.into();
        let items = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Ignoring malformed collection {}: {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read collection {}: {}", key, e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} {} records from {}", items.len(), T::KIND, key);

        Self {
            key,
            items: RwLock::new(items),
            store,
            bus,
        }
    }

    /// Storage key of this collection
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Snapshot of all records in insertion order
    pub fn all(&self) -> Vec<T> {
        self.items.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.items.read().iter().find(|item| item.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.read().iter().any(|item| item.id() == id)
    }

    /// Records matching a predicate, in insertion order
    pub fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.items
            .read()
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Append a record
    pub fn insert(&self, item: T) {
        let id = item.id().to_string();
        self.mutate(|items| items.push(item));
        self.announce(&id, RecordAction::Created);
    }

    /// Replace the record with the same id
    pub fn replace(&self, item: T) -> RegistryResult<()> {
        let id = item.id().to_string();
        let replaced = self.mutate(|items| match items.iter_mut().find(|x| x.id() == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        });
        if !replaced {
            return Err(RegistryError::not_found(T::KIND, id));
        }
        self.announce(&id, RecordAction::Updated);
        Ok(())
    }

    /// Modify a record in place and return the updated copy
    pub fn update<F>(&self, id: &str, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut T),
    {
        let updated = self.mutate(|items| {
            items.iter_mut().find(|x| x.id() == id).map(|slot| {
                f(slot);
                slot.clone()
            })
        });
        let updated = updated.ok_or_else(|| RegistryError::not_found(T::KIND, id))?;
        self.announce(id, RecordAction::Updated);
        Ok(updated)
    }

    /// Apply `f` to every record matching `predicate`; returns the ids touched
    pub fn update_where<P, F>(&self, predicate: P, f: F) -> Vec<String>
    where
        P: Fn(&T) -> bool,
        F: Fn(&mut T),
    {
        let touched = self.mutate(|items| {
            items
                .iter_mut()
                .filter(|x| predicate(x))
                .map(|slot| {
                    f(slot);
                    slot.id().to_string()
                })
                .collect::<Vec<_>>()
        });
        for id in &touched {
            self.announce(id, RecordAction::Updated);
        }
        touched
    }

    /// Remove a record by id
    pub fn remove(&self, id: &str) -> RegistryResult<T> {
        let removed = self.mutate(|items| {
            items
                .iter()
                .position(|x| x.id() == id)
                .map(|index| items.remove(index))
        });
        let removed = removed.ok_or_else(|| RegistryError::not_found(T::KIND, id))?;
        self.announce(id, RecordAction::Deleted);
        Ok(removed)
    }

    /// Remove every record matching `predicate`
    pub fn remove_where<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        let removed = self.mutate(|items| {
            let (gone, kept): (Vec<T>, Vec<T>) = items.drain(..).partition(|x| predicate(x));
            *items = kept;
            gone
        });
        for item in &removed {
            self.announce(item.id(), RecordAction::Deleted);
        }
        removed
    }

    /// Replace the whole collection
    pub fn replace_all(&self, new_items: Vec<T>) {
        self.mutate(|items| *items = new_items);
    }

    /// Run a mutation under the write lock, then persist the result
    fn mutate<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let (result, persisted) = {
            let mut items = self.items.write();
            let result = f(&mut items);
            let persisted = self.persist(&items);
            (result, persisted)
        };
        // Published after the lock is released so handlers may read back
        if let Err(e) = persisted {
            tracing::error!("{}", e);
            self.bus.emit(AppEvent::Storage(StorageEvent::WriteFailed {
                key: self.key.clone(),
                error: e.to_string(),
            }));
        }
        result
    }

    fn persist(&self, items: &[T]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items).map_err(|e| StorageError::Serialize {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&self.key, &json)
    }

    fn announce(&self, id: &str, action: RecordAction) {
        self.bus
            .emit(AppEvent::Record(RecordEvent::new(T::KIND, id, action)));
    }
}

impl<T: Record> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("key", &self.key)
            .field("len", &self.len())
            .finish()
    }
}
