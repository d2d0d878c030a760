//! Event type definitions for the event bus.
//!
//! Events are grouped by category and are cloneable and serializable so
//! they can be logged or replayed.

use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// A persisted record changed
    Record(RecordEvent),
    /// Drawing session transitions
    Drawing(DrawingEvent),
    /// Map widget lifecycle and viewport
    Map(MapEvent),
    /// Durable storage failures
    Storage(StorageEvent),
    /// User-facing notifications
    Notification(Notification),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Record(_) => EventCategory::Record,
            AppEvent::Drawing(_) => EventCategory::Drawing,
            AppEvent::Map(_) => EventCategory::Map,
            AppEvent::Storage(_) => EventCategory::Storage,
            AppEvent::Notification(_) => EventCategory::Notification,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Record(e) => e.description(),
            AppEvent::Drawing(e) => e.description(),
            AppEvent::Map(e) => e.description(),
            AppEvent::Storage(e) => e.description(),
            AppEvent::Notification(n) => format!("[{}] {}", n.level, n.message),
        }
    }

    /// Shorthand for an info notification
    pub fn info(message: impl Into<String>) -> Self {
        AppEvent::Notification(Notification::new(NotificationLevel::Info, message))
    }

    /// Shorthand for a success notification
    pub fn success(message: impl Into<String>) -> Self {
        AppEvent::Notification(Notification::new(NotificationLevel::Success, message))
    }

    /// Shorthand for a warning notification
    pub fn warning(message: impl Into<String>) -> Self {
        AppEvent::Notification(Notification::new(NotificationLevel::Warning, message))
    }

    /// Shorthand for an error notification
    pub fn error(message: impl Into<String>) -> Self {
        AppEvent::Notification(Notification::new(NotificationLevel::Error, message))
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Record mutation events.
    Record,
    /// Drawing session events.
    Drawing,
    /// Map widget events.
    Map,
    /// Storage events.
    Storage,
    /// Notification events.
    Notification,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventCategory::Record => "Record",
            EventCategory::Drawing => "Drawing",
            EventCategory::Map => "Map",
            EventCategory::Storage => "Storage",
            EventCategory::Notification => "Notification",
        };
        f.write_str(name)
    }
}

/// Kind of persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A field polygon.
    Field,
    /// A service order.
    Order,
    /// An aviation operator.
    Operator,
    /// A customer.
    Customer,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Field => "field",
            RecordKind::Order => "order",
            RecordKind::Operator => "operator",
            RecordKind::Customer => "customer",
        };
        f.write_str(name)
    }
}

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordAction {
    /// Appended to its collection.
    Created,
    /// Replaced in place.
    Updated,
    /// Removed from its collection.
    Deleted,
}

/// Record mutation event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEvent {
    /// Which collection.
    pub kind: RecordKind,
    /// Record id.
    pub id: String,
    /// The mutation.
    pub action: RecordAction,
}

impl RecordEvent {
    /// Create a record event
    pub fn new(kind: RecordKind, id: impl Into<String>, action: RecordAction) -> Self {
        Self {
            kind,
            id: id.into(),
            action,
        }
    }

    fn description(&self) -> String {
        format!("{} {} {:?}", self.kind, self.id, self.action)
    }
}

/// Drawing session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingEvent {
    /// Drawing mode entered.
    Started,
    /// A vertex was appended.
    VertexAdded {
        /// Vertices in the working list.
        count: usize,
        /// Live area in hectares, present once three vertices exist.
        area: Option<f64>,
    },
    /// Drawing ended with a usable polygon.
    Finished {
        /// Vertices in the working list.
        count: usize,
    },
    /// Cancelled with too few vertices; the working list was cleared.
    Discarded,
    /// Cancelled with a usable polygon; the working list was kept.
    Preserved {
        /// Vertices in the working list.
        count: usize,
    },
    /// The working list was replaced by manual coordinate entry.
    VerticesLoaded {
        /// Vertices in the working list.
        count: usize,
        /// Area in hectares.
        area: f64,
    },
    /// The working list was committed or reset.
    Cleared,
}

impl DrawingEvent {
    fn description(&self) -> String {
        match self {
            DrawingEvent::Started => "Drawing started".to_string(),
            DrawingEvent::VertexAdded { count, area } => match area {
                Some(area) => format!("Vertex {} added, area {} ha", count, area),
                None => format!("Vertex {} added", count),
            },
            DrawingEvent::Finished { count } => format!("Drawing finished with {} points", count),
            DrawingEvent::Discarded => "Drawing discarded".to_string(),
            DrawingEvent::Preserved { count } => {
                format!("Drawing cancelled, {} points kept", count)
            }
            DrawingEvent::VerticesLoaded { count, area } => {
                format!("{} points entered, area {} ha", count, area)
            }
            DrawingEvent::Cleared => "Drawing cleared".to_string(),
        }
    }
}

/// Map widget events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// The widget finished loading.
    Loaded,
    /// The widget could not be loaded; manual entry remains available.
    Unavailable {
        /// Why the widget is unavailable.
        reason: String,
    },
    /// All field polygons were re-rendered.
    Redrawn {
        /// Number of polygons on the map.
        polygons: usize,
    },
    /// The viewport moved to a field.
    Focused {
        /// Field id.
        field_id: String,
    },
}

impl MapEvent {
    fn description(&self) -> String {
        match self {
            MapEvent::Loaded => "Map loaded".to_string(),
            MapEvent::Unavailable { reason } => format!("Map unavailable: {}", reason),
            MapEvent::Redrawn { polygons } => format!("Map redrawn with {} polygons", polygons),
            MapEvent::Focused { field_id } => format!("Map focused on field {}", field_id),
        }
    }
}

/// Storage events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StorageEvent {
    /// A collection could not be written; memory stays authoritative.
    WriteFailed {
        /// Storage key.
        key: String,
        /// Error message.
        error: String,
    },
}

impl StorageEvent {
    fn description(&self) -> String {
        match self {
            StorageEvent::WriteFailed { key, error } => {
                format!("Failed to persist {}: {}", key, error)
            }
        }
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Neutral information.
    Info,
    /// An operation succeeded.
    Success,
    /// Rejected input or degraded mode.
    Warning,
    /// An operation failed.
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Display time of a notification unless configured otherwise
pub const DEFAULT_NOTIFICATION_MS: u64 = 5000;

fn default_notification_ms() -> u64 {
    DEFAULT_NOTIFICATION_MS
}

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
    /// How long the host keeps it visible.
    #[serde(default = "default_notification_ms")]
    pub duration_ms: u64,
}

impl Notification {
    /// Create a notification with the default display time
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration_ms: DEFAULT_NOTIFICATION_MS,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category() {
        let event = AppEvent::Record(RecordEvent::new(
            RecordKind::Field,
            "f1",
            RecordAction::Created,
        ));
        assert_eq!(event.category(), EventCategory::Record);
        assert_eq!(AppEvent::warning("x").category(), EventCategory::Notification);
        assert_eq!(
            AppEvent::Map(MapEvent::Loaded).category(),
            EventCategory::Map
        );
    }

    #[test]
    fn test_event_description() {
        let event = AppEvent::Drawing(DrawingEvent::VertexAdded {
            count: 3,
            area: Some(12.5),
        });
        assert_eq!(event.description(), "Vertex 3 added, area 12.5 ha");

        let event = AppEvent::Storage(StorageEvent::WriteFailed {
            key: "agroaviatech-fields".to_string(),
            error: "disk full".to_string(),
        });
        assert!(event.description().contains("agroaviatech-fields"));

        assert_eq!(AppEvent::error("boom").description(), "[error] boom");
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::success("Поле создано");
        let json = serde_json::to_string(&event).expect("serialize");
        let back: AppEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn test_notification_duration_defaults_when_missing() {
        let notification: Notification =
            serde_json::from_str(r#"{"level":"warning","message":"Нет карты"}"#)
                .expect("deserialize");
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert_eq!(notification.duration_ms, DEFAULT_NOTIFICATION_MS);

        let notification = Notification::new(NotificationLevel::Info, "x").with_duration(1500);
        assert_eq!(notification.duration_ms, 1500);
    }
}
