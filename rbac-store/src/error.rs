//! Store error types

use thiserror::Error;

/// Errors raised by store backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend failed to execute the operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// The transaction was already committed or rolled back
    #[error("Transaction already closed")]
    TransactionClosed,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
