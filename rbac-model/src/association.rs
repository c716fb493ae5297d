//! Association rows
//!
//! Many-to-many join rows linking roles to rules and roles to users. A role
//! owns its association rows: deleting the role through the cascade path
//! removes every row referencing it.

use serde::{Deserialize, Serialize};

use crate::{RoleId, RuleId, UserId};

/// Grants the rule `rule_id` to the role `role_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoleRule {
    /// Role holding the grant
    pub role_id: RoleId,
    /// Granted rule. May dangle if the rule was removed externally.
    pub rule_id: RuleId,
}

impl RoleRule {
    pub fn new(role_id: RoleId, rule_id: RuleId) -> Self {
        Self { role_id, rule_id }
    }
}

/// Assigns the role `role_id` to the user `user_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserRole {
    /// Assigned role
    pub role_id: RoleId,
    /// User holding the role
    pub user_id: UserId,
}

impl UserRole {
    pub fn new(role_id: RoleId, user_id: UserId) -> Self {
        Self { role_id, user_id }
    }
}
