//! AgroAviaTech Settings Crate
//!
//! Handles application configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{
    Config, FieldDefaults, MapSettings, NotificationSettings, PaletteSettings, StorageSettings,
    ZOOM_LIMIT,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
