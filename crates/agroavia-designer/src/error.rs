//! Error types for the field workspace.

use agroavia_core::{MapError, ValidationError};
use agroavia_registry::RegistryError;
use thiserror::Error;

/// Errors raised by workspace operations.
///
/// Every error is recoverable: the workspace stays usable and no state was
/// mutated by the failed call.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Input or form validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The map widget is missing or refused an operation.
    #[error(transparent)]
    Map(#[from] MapError),

    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An edit was saved while no field was being edited.
    #[error("No field is being edited")]
    NotEditing,

    /// There are no outlines to show for the current customer.
    #[error("Nothing to show on the map")]
    NothingToShow,
}

impl WorkspaceError {
    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Registry(RegistryError::Validation(_)))
    }

    /// Check if this is a map error
    pub fn is_map_error(&self) -> bool {
        matches!(self, Self::Map(_))
    }
}

/// Result type alias for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err: WorkspaceError = ValidationError::EmptyCoordinates.into();
        assert!(err.is_validation_error());
        assert_eq!(err.to_string(), "No coordinates entered");

        let err: WorkspaceError = MapError::NotReady.into();
        assert!(err.is_map_error());
        assert!(!err.is_validation_error());

        let err: WorkspaceError = RegistryError::Validation(ValidationError::missing("name")).into();
        assert!(err.is_validation_error());
    }
}
