//! Event Bus implementation.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of events to retain in history.
    pub max_history_size: usize,
    /// How long to retain events in history.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
struct TimestampedEvent {
    event: AppEvent,
    timestamp: Instant,
}

/// Error types for event bus operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Event bus carrying record, drawing, map, storage and notification events
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    history: RwLock<VecDeque<TimestampedEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of broadcast receivers that will see the event,
    /// or [`EventBusError::NoSubscribers`] when nobody is listening at all.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Publishing {}", event.description());

        if self.config.enable_history {
            self.add_to_history(&event);
        }

        // Handlers run outside the lock so they may subscribe or publish.
        let matching: Vec<EventHandler> = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        let has_handlers = !matching.is_empty();
        for handler in matching {
            handler(event.clone());
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) if has_handlers || self.subscriber_count() > 0 => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Publish and ignore the absence of subscribers
    pub fn emit(&self, event: AppEvent) {
        let _ = self.publish(event);
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler is called on the publishing thread and should return
    /// quickly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for polling events from a tokio task
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active handler subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get recent event history (if enabled)
    ///
    /// Returns events since the given instant, or all history if None.
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        if !self.config.enable_history {
            return Vec::new();
        }

        let history = self.history.read();
        history
            .iter()
            .filter(|e| since.map_or(true, |since| e.timestamp >= since))
            .map(|e| e.event.clone())
            .collect()
    }

    /// Clear event history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &AppEvent) {
        let mut history = self.history.write();
        let now = Instant::now();

        history.push_back(TimestampedEvent {
            event: event.clone(),
            timestamp: now,
        });

        let retention = self.config.history_retention;
        while history
            .front()
            .is_some_and(|e| now.duration_since(e.timestamp) > retention)
        {
            history.pop_front();
        }

        while history.len() > self.config.max_history_size {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{
        DrawingEvent, MapEvent, NotificationLevel, RecordAction, RecordEvent, RecordKind,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn created(id: &str) -> AppEvent {
        AppEvent::Record(RecordEvent::new(RecordKind::Field, id, RecordAction::Created))
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.publish(created("f1")),
            Err(EventBusError::NoSubscribers)
        ));
        // emit swallows the error
        bus.emit(created("f1"));
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let drawing = Arc::new(AtomicUsize::new(0));
        let notes = Arc::new(AtomicUsize::new(0));

        let d = drawing.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Drawing]),
            move |_| {
                d.fetch_add(1, Ordering::SeqCst);
            },
        );
        let n = notes.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Notification]),
            move |event| {
                if let AppEvent::Notification(note) = event {
                    assert_eq!(note.level, NotificationLevel::Warning);
                }
                n.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(AppEvent::Drawing(DrawingEvent::Started)).ok();
        bus.publish(AppEvent::warning("Need at least 3 points")).ok();
        bus.publish(AppEvent::Map(MapEvent::Loaded)).ok();

        assert_eq!(drawing.load(Ordering::SeqCst), 1);
        assert_eq!(notes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&bus);
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Record]),
            move |_| inner.emit(AppEvent::info("saved")),
        );
        let s = seen.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Notification]),
            move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.emit(created("f1"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_history_max_size() {
        let bus = EventBus::with_config(EventBusConfig {
            enable_history: true,
            max_history_size: 5,
            ..Default::default()
        });

        for i in 0..10 {
            bus.emit(created(&format!("f{i}")));
        }

        let history = bus.history(None);
        assert_eq!(history.len(), 5);
        assert_eq!(history[0], created("f5"));

        bus.clear_history();
        assert!(bus.history(None).is_empty());
    }

    #[test]
    fn test_history_disabled() {
        let bus = EventBus::new();
        bus.emit(created("f1"));
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        let count = bus.publish(AppEvent::success("done")).expect("receiver is live");
        assert_eq!(count, 1);

        match receiver.recv().await {
            Ok(AppEvent::Notification(note)) => assert_eq!(note.message, "done"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
