//! Role domain models
//!
//! This module provides the Role entity together with the payloads used to
//! create (`NewRole`) and bulk-modify (`RolePatch`) roles, and the validation
//! rules shared by both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::Record;
use crate::error::ValidationError;
use crate::status::Status;
use crate::value::Value;
use crate::{RoleId, SystemId};

/// A named bundle of permissions assignable to users within a subsystem.
///
/// Roles are created through the role service, which generates `role_id`,
/// and destroyed through the cascade deletion path together with their
/// association rows.
///
/// # Invariants
///
/// No two roles share `(system_id, name)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Generated unique identifier
    pub role_id: RoleId,

    /// Owning subsystem
    pub system_id: SystemId,

    /// Role name, unique within the subsystem
    pub name: String,

    /// Enabled or disabled
    pub status: Status,

    /// Optional free-form remark
    pub remark: Option<String>,

    /// When the role was created
    pub created_at: DateTime<Utc>,

    /// When the role was last modified
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Materialize a new role row from a creation payload.
    ///
    /// Used by stores once they have allocated `role_id`.
    pub fn from_new(role_id: RoleId, new_role: NewRole) -> Self {
        let now = Utc::now();
        Self {
            role_id,
            system_id: new_role.system_id,
            name: new_role.name,
            status: new_role.status,
            remark: new_role.remark,
            created_at: now,
            updated_at: now,
        }
    }

    /// Project this role to its drop-down list entry.
    pub fn to_option(&self) -> RoleOption {
        RoleOption {
            role_id: self.role_id,
            name: self.name.clone(),
        }
    }
}

/// Filterable columns of [`Role`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleColumn {
    RoleId,
    SystemId,
    Name,
    Status,
    Remark,
}

impl Record for Role {
    type Column = RoleColumn;

    fn get(&self, column: RoleColumn) -> Option<Value> {
        match column {
            RoleColumn::RoleId => Some(Value::Int(self.role_id)),
            RoleColumn::SystemId => Some(Value::Int(self.system_id)),
            RoleColumn::Name => Some(Value::Text(self.name.clone())),
            RoleColumn::Status => Some(self.status.into()),
            RoleColumn::Remark => self.remark.clone().map(Value::Text),
        }
    }
}

/// Length bounds applied when validating role attributes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldLimits {
    /// Maximum role name length in characters
    pub name_max_len: usize,

    /// Maximum remark length in characters
    pub remark_max_len: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            name_max_len: 50,
            remark_max_len: 50,
        }
    }
}

impl FieldLimits {
    fn check_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if name.chars().count() > self.name_max_len {
            return Err(ValidationError::TooLong {
                field: "name",
                max: self.name_max_len,
            });
        }
        Ok(())
    }

    fn check_remark(&self, remark: Option<&str>) -> Result<(), ValidationError> {
        match remark {
            Some(remark) if remark.chars().count() > self.remark_max_len => {
                Err(ValidationError::TooLong {
                    field: "remark",
                    max: self.remark_max_len,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Payload for creating a role.
///
/// # Examples
///
/// ```
/// use rbac_model::{FieldLimits, NewRole, Status, ValidationError};
///
/// let role = NewRole::new(1, "editor").with_status(Status::Disabled);
/// assert!(role.validate(&FieldLimits::default()).is_ok());
///
/// let blank = NewRole::new(1, "  ");
/// assert_eq!(
///     blank.validate(&FieldLimits::default()),
///     Err(ValidationError::Required("name"))
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRole {
    /// Owning subsystem (required)
    pub system_id: SystemId,

    /// Role name (required)
    pub name: String,

    /// Initial status, enabled unless specified
    #[serde(default)]
    pub status: Status,

    /// Optional remark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl NewRole {
    /// Creates an enabled role payload without remark.
    pub fn new(system_id: SystemId, name: impl Into<String>) -> Self {
        Self {
            system_id,
            name: name.into(),
            status: Status::Enabled,
            remark: None,
        }
    }

    /// Set the initial status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the remark.
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Check required fields and length bounds.
    ///
    /// Subsystem existence and name uniqueness need storage access and are
    /// checked by the role service.
    pub fn validate(&self, limits: &FieldLimits) -> Result<(), ValidationError> {
        limits.check_name(&self.name)?;
        limits.check_remark(self.remark.as_deref())
    }
}

/// Partial update applied to every role matching a condition.
///
/// `None` leaves a column untouched. `remark` is doubly optional so a patch
/// can clear it (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolePatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// New remark, or `Some(None)` to clear it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<Option<String>>,
}

impl RolePatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename matching roles.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the status of matching roles.
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set or clear the remark of matching roles.
    pub fn remark(mut self, remark: Option<String>) -> Self {
        self.remark = Some(remark);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.remark.is_none()
    }

    /// Check the length bounds of the values being written.
    pub fn validate(&self, limits: &FieldLimits) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            limits.check_name(name)?;
        }
        if let Some(remark) = &self.remark {
            limits.check_remark(remark.as_deref())?;
        }
        Ok(())
    }

    /// Apply the patch to a role and refresh `updated_at`.
    pub fn apply(&self, role: &mut Role) {
        if let Some(name) = &self.name {
            role.name = name.clone();
        }
        if let Some(status) = self.status {
            role.status = status;
        }
        if let Some(remark) = &self.remark {
            role.remark = remark.clone();
        }
        role.updated_at = Utc::now();
    }
}

/// Compact role entry for selection lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleOption {
    pub role_id: RoleId,
    pub name: String,
}
