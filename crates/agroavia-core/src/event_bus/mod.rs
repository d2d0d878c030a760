//! # Event Bus Module
//!
//! Notification channel between the stores, the drawing session and
//! whatever front end renders them.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Async consumers poll a broadcast receiver
//!
//! The bus is an ordinary value shared through `Arc`; there is no global
//! instance.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use agroavia_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Notification]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.publish(AppEvent::success("Field saved")).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
