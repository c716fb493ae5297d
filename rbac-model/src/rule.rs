//! Rule (permission node) model

use serde::{Deserialize, Serialize};

use crate::condition::Record;
use crate::status::Status;
use crate::value::Value;
use crate::{RuleId, SystemId};

/// A single permission node, e.g. a UI action or API operation, belonging to
/// a subsystem.
///
/// Rules are managed outside the core; the core only reads them.
///
/// # Examples
///
/// ```
/// use rbac_model::{Rule, Status};
///
/// let rule = Rule::new(3, 1, "user:create");
/// assert_eq!(rule.status, Status::Enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Unique rule identifier
    pub rule_id: RuleId,

    /// Owning subsystem
    pub system_id: SystemId,

    /// Permission identifier / human-readable name
    pub name: String,

    /// Enabled or disabled
    pub status: Status,
}

impl Rule {
    /// Creates a new enabled rule.
    pub fn new(rule_id: RuleId, system_id: SystemId, name: impl Into<String>) -> Self {
        Self {
            rule_id,
            system_id,
            name: name.into(),
            status: Status::Enabled,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// Filterable and projectable columns of [`Rule`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleColumn {
    RuleId,
    SystemId,
    Name,
    Status,
}

impl Default for RuleColumn {
    /// Access resolution projects rule names unless told otherwise.
    fn default() -> Self {
        Self::Name
    }
}

impl Record for Rule {
    type Column = RuleColumn;

    fn get(&self, column: RuleColumn) -> Option<Value> {
        Some(match column {
            RuleColumn::RuleId => Value::Int(self.rule_id),
            RuleColumn::SystemId => Value::Int(self.system_id),
            RuleColumn::Name => Value::Text(self.name.clone()),
            RuleColumn::Status => self.status.into(),
        })
    }
}
