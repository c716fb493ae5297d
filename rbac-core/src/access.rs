//! # Access resolution
//!
//! Computes the set of permission identifiers a role currently grants
//! within a subsystem.
//!
//! ## Resolution steps
//!
//! ```text
//! subsystem active? ──no──→ none
//!   │ yes
//! role {role_id, status, system_id}? ──no──→ none
//!   │ yes
//! RoleRule rows → distinct positive rule ids ──empty──→ none
//!   │
//! rules {system_id, status, rule_id IN ids} → project field → set
//! ```
//!
//! ## Fail-soft policy
//!
//! A broken lookup must never widen access. [`AccessResolver::resolve`]
//! converts every storage error into [`AccessSet::none`]; callers that need
//! the underlying error use [`AccessResolver::try_resolve`].

use rbac_model::{
    Condition, Record, RoleColumn, RoleId, RuleColumn, RuleId, Status, SystemId, Value,
};
use rbac_store::RbacStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::RbacResult;

/// Parameters of a resolution.
///
/// # Examples
///
/// ```
/// use rbac_core::AccessQuery;
/// use rbac_model::{RuleColumn, Status};
///
/// let query = AccessQuery::new(7, 1);
/// assert_eq!(query.status, Status::Enabled);
/// assert_eq!(query.field, RuleColumn::Name);
///
/// let ids = AccessQuery::new(7, 1).with_field(RuleColumn::RuleId);
/// assert_eq!(ids.field, RuleColumn::RuleId);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessQuery {
    /// Role whose grants are resolved
    pub role_id: RoleId,

    /// Subsystem the role and rules must belong to
    pub system_id: SystemId,

    /// Status both the role and the rules must have
    #[serde(default)]
    pub status: Status,

    /// Rule column projected into the result
    #[serde(default)]
    pub field: RuleColumn,
}

impl AccessQuery {
    /// Query for enabled rule names.
    pub fn new(role_id: RoleId, system_id: SystemId) -> Self {
        Self {
            role_id,
            system_id,
            status: Status::Enabled,
            field: RuleColumn::Name,
        }
    }

    /// Set the status filter.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the projected rule column.
    pub fn with_field(mut self, field: RuleColumn) -> Self {
        self.field = field;
        self
    }
}

/// Deduplicated set of projected rule values.
///
/// Iteration order is not part of the contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccessSet {
    values: BTreeSet<Value>,
}

impl AccessSet {
    /// The "no access" result.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the set contains the value.
    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    /// Whether a permission with this name is granted.
    ///
    /// Only meaningful for sets projected on [`RuleColumn::Name`].
    pub fn allows(&self, permission: &str) -> bool {
        self.contains(&Value::from(permission))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Values as a sorted vector, for stable presentation.
    pub fn into_sorted_vec(self) -> Vec<Value> {
        self.values.into_iter().collect()
    }
}

impl FromIterator<Value> for AccessSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AccessSet {
    type Item = Value;
    type IntoIter = std::collections::btree_set::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Resolves the grants of a role.
///
/// Stateless apart from the shared store handle; every call reads the
/// current persisted state. Reads are not wrapped in a transaction, so a
/// resolution racing a write may observe a mix of before and after.
#[derive(Clone)]
pub struct AccessResolver {
    store: Arc<dyn RbacStore>,
}

impl std::fmt::Debug for AccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessResolver").finish_non_exhaustive()
    }
}

impl AccessResolver {
    /// Create a resolver over a store.
    pub fn new(store: Arc<dyn RbacStore>) -> Self {
        Self { store }
    }

    /// Resolve a query, failing soft.
    ///
    /// Storage errors are logged and yield [`AccessSet::none`].
    pub async fn resolve(&self, query: &AccessQuery) -> AccessSet {
        match self.try_resolve(query).await {
            Ok(access) => access,
            Err(e) => {
                tracing::warn!(
                    role_id = query.role_id,
                    system_id = query.system_id,
                    error = %e,
                    "Access resolution failed, granting nothing"
                );
                AccessSet::none()
            }
        }
    }

    /// Resolve enabled rule names for a role.
    pub async fn resolve_names(&self, role_id: RoleId, system_id: SystemId) -> AccessSet {
        self.resolve(&AccessQuery::new(role_id, system_id)).await
    }

    /// Resolve a query, propagating storage errors.
    ///
    /// An inactive subsystem or a role that does not match is not an error:
    /// both resolve to the empty set.
    pub async fn try_resolve(&self, query: &AccessQuery) -> RbacResult<AccessSet> {
        if !self.store.is_active(query.system_id).await? {
            tracing::debug!(system_id = query.system_id, "Subsystem inactive or unknown");
            return Ok(AccessSet::none());
        }

        let role_filter = Condition::new()
            .eq(RoleColumn::RoleId, query.role_id)
            .eq(RoleColumn::Status, query.status)
            .eq(RoleColumn::SystemId, query.system_id);
        let Some(role) = self.store.find_role(&role_filter).await? else {
            tracing::debug!(role_id = query.role_id, "No matching role");
            return Ok(AccessSet::none());
        };

        let rule_ids: BTreeSet<RuleId> = self
            .store
            .rules_for_role(role.role_id)
            .await?
            .into_iter()
            .map(|row| row.rule_id)
            .filter(|rule_id| *rule_id > 0)
            .collect();
        if rule_ids.is_empty() {
            return Ok(AccessSet::none());
        }

        let rule_filter = Condition::new()
            .eq(RuleColumn::SystemId, query.system_id)
            .eq(RuleColumn::Status, query.status)
            .is_in(RuleColumn::RuleId, rule_ids);
        let access: AccessSet = self
            .store
            .find_rules(&rule_filter)
            .await?
            .iter()
            .filter_map(|rule| rule.get(query.field))
            .collect();

        tracing::debug!(
            role_id = query.role_id,
            system_id = query.system_id,
            granted = access.len(),
            "Access resolved"
        );
        Ok(access)
    }
}
