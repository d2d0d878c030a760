//! # AgroAviaTech
//!
//! Field, order and fleet management for agricultural aerial spraying.
//!
//! ## Architecture
//!
//! AgroAviaTech is organized as a workspace with multiple crates:
//!
//! 1. **agroavia-core** - Errors, field geometry, record ids, event bus
//! 2. **agroavia-settings** - Application configuration
//! 3. **agroavia-registry** - Records, persistence, relations, export
//! 4. **agroavia-designer** - Map contract, outline drawing, field workspace
//! 5. **agroavia** - Command-line front end that integrates all crates
//!
//! ## Features
//!
//! - **Field outlines**: drawn on a map widget or typed as coordinate pairs,
//!   with live area in hectares
//! - **Orders**: created per field, tracked by status, assigned to operators
//! - **Relations**: deletes that block, orphan or cascade to dependents
//! - **Export**: JSON bundles per customer and orders as CSV

pub mod cli;

pub use agroavia_designer as designer;
pub use agroavia_registry as registry;
pub use agroavia_settings as settings;

pub use agroavia_core::{
    AppEvent, Bounds, Error, EventBus, MapError, Notification, NotificationLevel, Result,
    StorageError, ValidationError, Vertex,
};
pub use agroavia_designer::{FieldWorkspace, HeadlessMap, MapLoader, MapWidget, WorkspaceError};
pub use agroavia_registry::{DeletePolicy, Field, Order, Registry, RegistryError};
pub use agroavia_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Log lines go to stderr so command output on stdout stays clean.
/// `RUST_LOG` selects the level, `info` when unset. With `json` every event
/// is written as one JSON object per line.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}
