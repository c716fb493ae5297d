//! Validation errors for role attributes.

use thiserror::Error;

use crate::SystemId;

/// Attribute validation failures.
///
/// Surfaced to callers at creation and update time; never masked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required attribute is missing or blank
    #[error("Missing required field: {0}")]
    Required(&'static str),

    /// An attribute exceeds its length bound
    #[error("Field {field} exceeds {max} characters")]
    TooLong {
        /// Attribute name.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },

    /// A role with this name already exists in the subsystem
    #[error("Role '{name}' already exists in system {system_id}")]
    DuplicateName {
        /// Conflicting role name.
        name: String,
        /// Subsystem the name is taken in.
        system_id: SystemId,
    },

    /// The referenced subsystem does not exist
    #[error("Unknown subsystem: {0}")]
    UnknownSubsystem(SystemId),
}
