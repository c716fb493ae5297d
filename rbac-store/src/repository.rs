//! Repository traits
//!
//! One trait per entity, each exposing only what the RBAC core needs.
//! Backends implement all of them; [`RbacStore`] is the umbrella trait that
//! services hold as `Arc<dyn RbacStore>`.

use async_trait::async_trait;
use rbac_model::{
    Condition, NewRole, Role, RoleColumn, RoleId, RolePatch, RoleRule, Rule, RuleColumn, RuleId,
    SystemId, UserId, UserRole,
};

use crate::error::StoreResult;

/// Validates subsystem identifiers.
#[async_trait]
pub trait SubsystemRegistry: Send + Sync {
    /// Whether the subsystem is known, active or not.
    async fn exists(&self, system_id: SystemId) -> StoreResult<bool>;

    /// Whether the subsystem is known and active.
    async fn is_active(&self, system_id: SystemId) -> StoreResult<bool>;
}

/// Role rows.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Insert a role, allocating its `role_id`.
    ///
    /// Fails with `Conflict` if `(system_id, name)` is taken.
    async fn insert_role(&self, role: NewRole) -> StoreResult<Role>;

    /// First role matching the condition, in `role_id` order.
    async fn find_role(&self, condition: &Condition<RoleColumn>) -> StoreResult<Option<Role>>;

    /// All roles matching the condition, in `role_id` order.
    async fn find_roles(&self, condition: &Condition<RoleColumn>) -> StoreResult<Vec<Role>>;

    /// A window of matching roles, in `role_id` order.
    async fn list_roles(
        &self,
        condition: &Condition<RoleColumn>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Role>>;

    /// Number of matching roles.
    async fn count_roles(&self, condition: &Condition<RoleColumn>) -> StoreResult<u64>;

    /// Apply a patch to every matching role. Returns the affected count.
    ///
    /// Fails with `Conflict`, writing nothing, if the patch would give two
    /// roles the same `(system_id, name)`.
    async fn update_roles(
        &self,
        condition: &Condition<RoleColumn>,
        patch: &RolePatch,
    ) -> StoreResult<u64>;

    /// Delete every matching role. Associations are left untouched.
    async fn delete_roles(&self, condition: &Condition<RoleColumn>) -> StoreResult<u64>;
}

/// Rule rows (read-only for the core).
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// All rules matching the condition.
    async fn find_rules(&self, condition: &Condition<RuleColumn>) -> StoreResult<Vec<Rule>>;
}

/// Role to rule associations.
#[async_trait]
pub trait RoleRuleStore: Send + Sync {
    /// Grant a rule to a role. Both must exist.
    async fn assign_rule(&self, role_id: RoleId, rule_id: RuleId) -> StoreResult<RoleRule>;

    /// Every association row of the role, duplicates included.
    async fn rules_for_role(&self, role_id: RoleId) -> StoreResult<Vec<RoleRule>>;
}

/// Role to user associations.
#[async_trait]
pub trait UserRoleStore: Send + Sync {
    /// Assign a role to a user. The role must exist.
    async fn assign_user(&self, role_id: RoleId, user_id: UserId) -> StoreResult<UserRole>;

    /// Every assignment row of the role.
    async fn users_for_role(&self, role_id: RoleId) -> StoreResult<Vec<UserRole>>;
}

/// A unit of writes that commits or rolls back as a whole.
///
/// Writes are invisible to other readers until `commit` succeeds. Once
/// committed or rolled back, every further call fails with
/// `TransactionClosed`. Dropping an open transaction rolls it back.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Delete every `RoleRule` row of the role.
    async fn delete_role_rules(&mut self, role_id: RoleId) -> StoreResult<u64>;

    /// Delete every `UserRole` row of the role.
    async fn delete_user_roles(&mut self, role_id: RoleId) -> StoreResult<u64>;

    /// Delete every matching role.
    async fn delete_roles(&mut self, condition: &Condition<RoleColumn>) -> StoreResult<u64>;

    /// Make all writes visible atomically.
    async fn commit(&mut self) -> StoreResult<()>;

    /// Discard all writes.
    async fn rollback(&mut self) -> StoreResult<()>;
}

/// Opens transactions.
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;
}

/// Everything the RBAC core needs from a backend.
pub trait RbacStore:
    SubsystemRegistry + RoleStore + RuleStore + RoleRuleStore + UserRoleStore + TransactionalStore
{
}

impl<T> RbacStore for T where
    T: SubsystemRegistry
        + RoleStore
        + RuleStore
        + RoleRuleStore
        + UserRoleStore
        + TransactionalStore
{
}
