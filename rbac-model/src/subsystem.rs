//! Subsystem (namespace) model

use serde::{Deserialize, Serialize};

use crate::SystemId;

/// A subsystem partitions roles and rules, so the same role name can exist
/// independently per application or module.
///
/// # Examples
///
/// ```
/// use rbac_model::Subsystem;
///
/// let admin = Subsystem::new(1, "admin-console");
/// assert!(admin.is_active);
/// assert!(!admin.deactivated().is_active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subsystem {
    /// Unique subsystem identifier
    pub system_id: SystemId,

    /// Human-readable name
    pub name: String,

    /// Whether the subsystem accepts access resolution
    pub is_active: bool,
}

impl Subsystem {
    /// Creates a new active subsystem.
    pub fn new(system_id: SystemId, name: impl Into<String>) -> Self {
        Self {
            system_id,
            name: name.into(),
            is_active: true,
        }
    }

    /// Return the same subsystem marked inactive.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}
