//! Error handling for AgroAviaTech
//!
//! Provides error types for the layers that the core crate knows about:
//! - Validation errors (coordinate input, polygon shape, form payloads)
//! - Map errors (widget loading and overlay management)
//! - Storage errors (key-value persistence)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Input validation error type
///
/// Raised before any state is mutated. The caller reports it to the user
/// and aborts the operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A polygon has fewer vertices than a field requires
    #[error("Polygon must contain at least {required} points, got {count}")]
    TooFewVertices {
        /// The number of vertices supplied.
        count: usize,
        /// The minimum number of vertices.
        required: usize,
    },

    /// Manual coordinate input was empty
    #[error("No coordinates entered")]
    EmptyCoordinates,

    /// A `lat,lng` pair could not be parsed into two finite numbers
    #[error("Malformed coordinate pair '{pair}' (expected 'lat,lng; lat,lng; ...')")]
    MalformedCoordinates {
        /// The offending pair as typed.
        pair: String,
    },

    /// A required form field is missing or blank
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// A form field holds an unusable value
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MissingField`]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidValue`]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Map widget error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    /// No map widget is attached or it has not finished loading
    #[error("Map is not ready")]
    NotReady,

    /// The widget script failed to load
    #[error("Failed to load map widget: {reason}")]
    LoadFailed {
        /// The reason reported by the loader.
        reason: String,
    },

    /// The widget refused an overlay
    #[error("Map overlay rejected: {reason}")]
    OverlayRejected {
        /// The reason reported by the widget.
        reason: String,
    },
}

/// Storage error type
///
/// Represents failures of the durable key-value store backing the
/// record collections.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// A key could not be read
    #[error("Failed to read '{key}': {reason}")]
    Read {
        /// The storage key.
        key: String,
        /// The underlying failure.
        reason: String,
    },

    /// A key could not be written
    #[error("Failed to write '{key}': {reason}")]
    Write {
        /// The storage key.
        key: String,
        /// The underlying failure.
        reason: String,
    },

    /// A collection could not be serialized
    #[error("Failed to serialize '{key}': {reason}")]
    Serialize {
        /// The storage key.
        key: String,
        /// The serializer message.
        reason: String,
    },
}

impl StorageError {
    /// The key the failure relates to
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. } | Self::Write { key, .. } | Self::Serialize { key, .. } => key,
        }
    }
}

/// Main error type for AgroAviaTech
///
/// A unified error type that can represent any core error.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Map error
    #[error(transparent)]
    Map(#[from] MapError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a map error
    pub fn is_map_error(&self) -> bool {
        matches!(self, Error::Map(_))
    }

    /// Check if this is a storage error
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
