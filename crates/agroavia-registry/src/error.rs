//! Error types for the record registry crate.
//!
//! This module provides structured error types for record management,
//! persistence, relations and export.

use agroavia_core::{RecordKind, StorageError, ValidationError};
use std::io;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The requested record was not found.
    #[error("No {kind} with id '{id}'")]
    NotFound { kind: RecordKind, id: String },

    /// Deleting the record would leave dependents behind.
    #[error("Cannot delete {kind} '{id}': it still has {dependents}")]
    DeleteBlocked {
        kind: RecordKind,
        id: String,
        dependents: String,
    },

    /// A form payload failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RegistryError {
    /// Shorthand for [`RegistryError::NotFound`]
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::not_found(RecordKind::Order, "o-1");
        assert_eq!(err.to_string(), "No order with id 'o-1'");

        let err = RegistryError::DeleteBlocked {
            kind: RecordKind::Customer,
            id: "c-1".to_string(),
            dependents: "2 fields, 1 order".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete customer 'c-1': it still has 2 fields, 1 order"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: RegistryError = ValidationError::missing("name").into();
        assert!(matches!(err, RegistryError::Validation(_)));

        let err: RegistryError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, RegistryError::Io(_)));

        let err: RegistryError = StorageError::Read {
            key: "k".to_string(),
            reason: "denied".to_string(),
        }
        .into();
        assert!(matches!(err, RegistryError::Storage(_)));
    }
}
