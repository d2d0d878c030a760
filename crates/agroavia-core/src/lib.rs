//! # AgroAviaTech Core
//!
//! Core types and utilities for AgroAviaTech.
//! Provides the error taxonomy, field geometry, record ids and the
//! event bus used as the notification channel.

pub mod error;
pub mod event_bus;
pub mod geo;
pub mod ids;

pub use error::{Error, MapError, Result, StorageError, ValidationError};

pub use event_bus::{
    AppEvent, DrawingEvent, EventBus, EventBusConfig, EventCategory, EventFilter, MapEvent,
    Notification, NotificationLevel, RecordAction, RecordEvent, RecordKind, StorageEvent,
    SubscriptionId, DEFAULT_NOTIFICATION_MS,
};

pub use geo::{
    centroid, centroid_or, close_polygon, is_closed, polygon_area_hectares, Bounds, Vertex,
    DEFAULT_CENTER, MIN_POLYGON_VERTICES,
};

pub use ids::generate_id;
