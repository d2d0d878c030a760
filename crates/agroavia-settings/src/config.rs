//! Configuration management for AgroAviaTech
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Map widget settings (script URL, viewport defaults, focus behaviour)
//! - Polygon palette
//! - Storage location and key naming
//! - Field form defaults
//! - Notification display

use agroavia_core::geo::{Vertex, DEFAULT_CENTER};
use agroavia_core::DEFAULT_NOTIFICATION_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Application directory name under the platform config/data dirs
pub const APP_DIR: &str = "agroavia";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Highest zoom level accepted for the map widget
pub const ZOOM_LIMIT: u8 = 23;

/// Map widget settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Script URL with `{version}`, `{api_key}` and `{lang}` placeholders
    pub script_url_template: String,
    /// Widget API key
    pub api_key: String,
    /// Widget language
    pub lang: String,
    /// Widget API version
    pub version: String,
    /// Initial map center, also the centroid fallback
    pub default_center: Vertex,
    /// Initial zoom level
    pub default_zoom: u8,
    /// Focusing a field never zooms in past this level
    pub max_zoom: u8,
    /// Zoom levels added when focusing a single field
    pub focus_zoom_step: u8,
    /// Margin in pixels when fitting all fields
    pub bounds_margin: u32,
    /// How long a focused field stays highlighted
    pub highlight_duration_ms: u64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            script_url_template:
                "https://api-maps.yandex.ru/{version}/?apikey={api_key}&lang={lang}".to_string(),
            api_key: String::new(),
            lang: "ru_RU".to_string(),
            version: "2.1".to_string(),
            default_center: DEFAULT_CENTER,
            default_zoom: 10,
            max_zoom: ZOOM_LIMIT,
            focus_zoom_step: 2,
            bounds_margin: 50,
            highlight_duration_ms: 3000,
        }
    }
}

impl MapSettings {
    /// Script URL with the placeholders filled in
    pub fn script_url(&self) -> String {
        self.script_url_template
            .replace("{version}", &self.version)
            .replace("{api_key}", &self.api_key)
            .replace("{lang}", &self.lang)
    }
}

/// Polygon colors by field status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    /// Fill for fields with no dedicated color
    pub default: String,
    /// Fill for processed fields
    pub processed: String,
    /// Fill for pending fields
    pub pending: String,
    /// Fill of the drawing preview
    pub drawing: String,
    /// Outline color
    pub stroke: String,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            default: "#FFFF00".to_string(),
            processed: "#00FF00".to_string(),
            pending: "#FF0000".to_string(),
            drawing: "#00FF00".to_string(),
            stroke: "#0000FF".to_string(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one JSON file per collection
    pub data_dir: PathBuf,
    /// Prefix of every collection key
    pub key_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let mut data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        data_dir.push(APP_DIR);

        Self {
            data_dir,
            key_prefix: "agroaviatech".to_string(),
        }
    }
}

impl StorageSettings {
    /// Storage key of a collection, e.g. `agroaviatech-fields`
    pub fn key(&self, collection: &str) -> String {
        format!("{}-{}", self.key_prefix, collection)
    }
}

/// Defaults of the field form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    /// Crop preselected in the form
    pub crop: String,
    /// Region preselected in the form
    pub region: String,
    /// Price per hectare preselected in the form
    pub price: f64,
    /// Status of new fields
    pub status: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            crop: "пшеница".to_string(),
            region: "Московская область".to_string(),
            price: 1000.0,
            status: "pending".to_string(),
        }
    }
}

/// Notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// How long a notification stays visible
    pub duration_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_NOTIFICATION_MS,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Map widget settings
    pub map: MapSettings,
    /// Polygon palette
    pub palette: PaletteSettings,
    /// Storage settings
    pub storage: StorageSettings,
    /// Field form defaults
    pub fields: FieldDefaults,
    /// Notification settings
    pub notifications: NotificationSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config directory for the application
    pub fn config_dir() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SettingsError::ConfigDirectory("no home directory".to_string()))?;
        path.push(APP_DIR);
        Ok(path)
    }

    /// Default config file path
    pub fn default_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from the default path, falling back to defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.key_prefix.trim().is_empty() {
            return Err(ConfigError::MissingKey("storage.key_prefix".to_string()));
        }

        if self.map.max_zoom > ZOOM_LIMIT {
            return Err(ConfigError::ValueOutOfRange {
                key: "map.max_zoom".to_string(),
                value: self.map.max_zoom.to_string(),
            });
        }

        if self.map.default_zoom > self.map.max_zoom {
            return Err(ConfigError::ValueOutOfRange {
                key: "map.default_zoom".to_string(),
                value: self.map.default_zoom.to_string(),
            });
        }

        if !self.map.default_center.is_finite() {
            return Err(ConfigError::ValueOutOfRange {
                key: "map.default_center".to_string(),
                value: self.map.default_center.to_string(),
            });
        }

        let colors = [
            ("palette.default", &self.palette.default),
            ("palette.processed", &self.palette.processed),
            ("palette.pending", &self.palette.pending),
            ("palette.drawing", &self.palette.drawing),
            ("palette.stroke", &self.palette.stroke),
        ];
        if let Some((key, _)) = colors.iter().find(|(_, color)| color.trim().is_empty()) {
            return Err(ConfigError::MissingKey((*key).to_string()));
        }

        if self.notifications.duration_ms == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "notifications.duration_ms".to_string(),
                value: "0".to_string(),
            });
        }

        if !self.fields.price.is_finite() || self.fields.price < 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "fields.price".to_string(),
                value: self.fields.price.to_string(),
            });
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
