//! Error types for RBAC core operations
//!
//! Every public operation has a typed form returning [`RbacResult`].
//! Validation failures and storage failures stay distinguishable so callers
//! can report the former and alert on the latter.

use rbac_model::ValidationError;
use rbac_store::StoreError;
use thiserror::Error;

/// RBAC core error types.
#[derive(Debug, Error)]
pub enum RbacError {
    /// Role attributes are invalid (missing, too long, duplicate, unknown subsystem)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type for RBAC core operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Check if this error should be logged at error level.
    ///
    /// Validation failures are caller mistakes; conflicts are expected under
    /// concurrent creation.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            RbacError::Storage(StoreError::Backend(_) | StoreError::TransactionClosed)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::Validation(ValidationError::Required(_)) => "FIELD_REQUIRED",
            RbacError::Validation(ValidationError::TooLong { .. }) => "FIELD_TOO_LONG",
            RbacError::Validation(ValidationError::DuplicateName { .. }) => "DUPLICATE_ROLE_NAME",
            RbacError::Validation(ValidationError::UnknownSubsystem(_)) => "UNKNOWN_SUBSYSTEM",
            RbacError::Storage(StoreError::NotFound(_)) => "NOT_FOUND",
            RbacError::Storage(StoreError::Conflict(_)) => "CONFLICT",
            RbacError::Storage(StoreError::Backend(_))
            | RbacError::Storage(StoreError::TransactionClosed) => "STORAGE_ERROR",
        }
    }
}
