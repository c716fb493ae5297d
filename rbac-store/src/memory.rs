//! In-memory implementation of the RBAC store.
//!
//! # Purpose
//! Implements every repository trait with plain collections guarded by a
//! single `tokio::sync::RwLock`. It exists for tests, local development and
//! single-process deployments where durability is not required.
//!
//! # Consistency
//! - Reads take the read lock; single-statement writes take the write lock.
//! - A transaction holds the write lock for its whole lifetime and works on a
//!   staged copy of the tables. `commit` swaps the copy in, so readers see
//!   either none or all of its writes.
//! - The unique `(system_id, name)` index on roles is enforced on insert and
//!   on bulk update.
//!
//! # Fault injection
//! [`MemoryStore::inject_fault`] makes a named operation fail with
//! `StoreError::Backend` until the fault is cleared. Tests use it to exercise
//! rollback and fail-soft paths.

use async_trait::async_trait;
use rbac_model::{
    Condition, NewRole, Role, RoleColumn, RoleId, RolePatch, RoleRule, Rule, RuleColumn, RuleId,
    Subsystem, SystemId, UserId, UserRole,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::repository::{
    RoleRuleStore, RoleStore, RuleStore, StoreTransaction, SubsystemRegistry,
    TransactionalStore, UserRoleStore,
};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    SubsystemLookup,
    InsertRole,
    FindRoles,
    CountRoles,
    UpdateRoles,
    DeleteRoles,
    FindRules,
    AssignRule,
    ListRoleRules,
    AssignUser,
    ListUserRoles,
    Begin,
    TxDeleteRoleRules,
    TxDeleteUserRoles,
    TxDeleteRoles,
    Commit,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubsystemLookup => "subsystem_lookup",
            Self::InsertRole => "insert_role",
            Self::FindRoles => "find_roles",
            Self::CountRoles => "count_roles",
            Self::UpdateRoles => "update_roles",
            Self::DeleteRoles => "delete_roles",
            Self::FindRules => "find_rules",
            Self::AssignRule => "assign_rule",
            Self::ListRoleRules => "list_role_rules",
            Self::AssignUser => "assign_user",
            Self::ListUserRoles => "list_user_roles",
            Self::Begin => "begin",
            Self::TxDeleteRoleRules => "tx_delete_role_rules",
            Self::TxDeleteUserRoles => "tx_delete_user_roles",
            Self::TxDeleteRoles => "tx_delete_roles",
            Self::Commit => "commit",
        }
    }
}

type Faults = Arc<RwLock<HashSet<StoreOp>>>;

async fn check_fault(faults: &Faults, op: StoreOp) -> StoreResult<()> {
    if faults.read().await.contains(&op) {
        tracing::debug!(op = op.as_str(), "Injected store fault triggered");
        return Err(StoreError::Backend(format!("injected fault: {}", op.as_str())));
    }
    Ok(())
}

/// All tables of the store.
#[derive(Debug, Clone, Default)]
struct Tables {
    subsystems: BTreeMap<SystemId, Subsystem>,
    roles: BTreeMap<RoleId, Role>,
    rules: BTreeMap<RuleId, Rule>,
    role_rules: Vec<RoleRule>,
    user_roles: Vec<UserRole>,
    last_role_id: RoleId,
}

impl Tables {
    fn name_taken(&self, system_id: SystemId, name: &str) -> bool {
        self.roles
            .values()
            .any(|role| role.system_id == system_id && role.name == name)
    }

    fn matching_roles<'a>(
        &'a self,
        condition: &'a Condition<RoleColumn>,
    ) -> impl Iterator<Item = &'a Role> + 'a {
        self.roles.values().filter(move |role| condition.matches(*role))
    }

    fn delete_role_rules(&mut self, role_id: RoleId) -> u64 {
        let before = self.role_rules.len();
        self.role_rules.retain(|row| row.role_id != role_id);
        (before - self.role_rules.len()) as u64
    }

    fn delete_user_roles(&mut self, role_id: RoleId) -> u64 {
        let before = self.user_roles.len();
        self.user_roles.retain(|row| row.role_id != role_id);
        (before - self.user_roles.len()) as u64
    }

    fn delete_roles(&mut self, condition: &Condition<RoleColumn>) -> u64 {
        let before = self.roles.len();
        self.roles.retain(|_, role| !condition.matches(&*role));
        (before - self.roles.len()) as u64
    }
}

/// In-memory RBAC store.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Faults,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a subsystem.
    pub async fn insert_subsystem(&self, subsystem: Subsystem) {
        let mut tables = self.tables.write().await;
        tables.subsystems.insert(subsystem.system_id, subsystem);
    }

    /// Register or replace a rule.
    pub async fn insert_rule(&self, rule: Rule) {
        let mut tables = self.tables.write().await;
        tables.rules.insert(rule.rule_id, rule);
    }

    /// Remove a rule without touching associations, as an external rule
    /// manager would. Returns whether the rule existed.
    pub async fn remove_rule(&self, rule_id: RuleId) -> bool {
        let mut tables = self.tables.write().await;
        tables.rules.remove(&rule_id).is_some()
    }

    /// Bulk-load association rows without referential checks, e.g. from a
    /// legacy export.
    pub async fn import_role_rules(&self, rows: impl IntoIterator<Item = RoleRule>) {
        let mut tables = self.tables.write().await;
        tables.role_rules.extend(rows);
    }

    /// Make `op` fail until the fault is cleared.
    pub async fn inject_fault(&self, op: StoreOp) {
        self.faults.write().await.insert(op);
    }

    /// Clear a single injected fault.
    pub async fn clear_fault(&self, op: StoreOp) {
        self.faults.write().await.remove(&op);
    }

    /// Clear all injected faults.
    pub async fn clear_faults(&self) {
        self.faults.write().await.clear();
    }

    async fn fault(&self, op: StoreOp) -> StoreResult<()> {
        check_fault(&self.faults, op).await
    }
}

#[async_trait]
impl SubsystemRegistry for MemoryStore {
    async fn exists(&self, system_id: SystemId) -> StoreResult<bool> {
        self.fault(StoreOp::SubsystemLookup).await?;
        Ok(self.tables.read().await.subsystems.contains_key(&system_id))
    }

    async fn is_active(&self, system_id: SystemId) -> StoreResult<bool> {
        self.fault(StoreOp::SubsystemLookup).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .subsystems
            .get(&system_id)
            .map(|s| s.is_active)
            .unwrap_or(false))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn insert_role(&self, role: NewRole) -> StoreResult<Role> {
        self.fault(StoreOp::InsertRole).await?;
        let mut tables = self.tables.write().await;

        if tables.name_taken(role.system_id, &role.name) {
            return Err(StoreError::Conflict(format!(
                "role '{}' already exists in system {}",
                role.name, role.system_id
            )));
        }

        tables.last_role_id += 1;
        let role = Role::from_new(tables.last_role_id, role);
        tables.roles.insert(role.role_id, role.clone());

        tracing::debug!(role_id = role.role_id, system_id = role.system_id, "Role inserted");
        Ok(role)
    }

    async fn find_role(&self, condition: &Condition<RoleColumn>) -> StoreResult<Option<Role>> {
        self.fault(StoreOp::FindRoles).await?;
        let tables = self.tables.read().await;
        let role = tables.matching_roles(condition).next().cloned();
        Ok(role)
    }

    async fn find_roles(&self, condition: &Condition<RoleColumn>) -> StoreResult<Vec<Role>> {
        self.fault(StoreOp::FindRoles).await?;
        let tables = self.tables.read().await;
        Ok(tables.matching_roles(condition).cloned().collect())
    }

    async fn list_roles(
        &self,
        condition: &Condition<RoleColumn>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Role>> {
        self.fault(StoreOp::FindRoles).await?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let tables = self.tables.read().await;
        Ok(tables
            .matching_roles(condition)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_roles(&self, condition: &Condition<RoleColumn>) -> StoreResult<u64> {
        self.fault(StoreOp::CountRoles).await?;
        let tables = self.tables.read().await;
        Ok(tables.matching_roles(condition).count() as u64)
    }

    async fn update_roles(
        &self,
        condition: &Condition<RoleColumn>,
        patch: &RolePatch,
    ) -> StoreResult<u64> {
        self.fault(StoreOp::UpdateRoles).await?;
        let mut tables = self.tables.write().await;

        let mut roles = tables.roles.clone();
        let mut affected = 0;
        for role in roles.values_mut().filter(|role| condition.matches(&**role)) {
            patch.apply(role);
            affected += 1;
        }

        {
            let mut seen = HashSet::new();
            for role in roles.values() {
                if !seen.insert((role.system_id, role.name.as_str())) {
                    return Err(StoreError::Conflict(format!(
                        "role '{}' already exists in system {}",
                        role.name, role.system_id
                    )));
                }
            }
        }

        tables.roles = roles;
        tracing::debug!(affected, "Roles updated");
        Ok(affected)
    }

    async fn delete_roles(&self, condition: &Condition<RoleColumn>) -> StoreResult<u64> {
        self.fault(StoreOp::DeleteRoles).await?;
        let affected = self.tables.write().await.delete_roles(condition);
        tracing::debug!(affected, "Roles deleted");
        Ok(affected)
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn find_rules(&self, condition: &Condition<RuleColumn>) -> StoreResult<Vec<Rule>> {
        self.fault(StoreOp::FindRules).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .rules
            .values()
            .filter(|rule| condition.matches(*rule))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleRuleStore for MemoryStore {
    async fn assign_rule(&self, role_id: RoleId, rule_id: RuleId) -> StoreResult<RoleRule> {
        self.fault(StoreOp::AssignRule).await?;
        let mut tables = self.tables.write().await;

        if !tables.roles.contains_key(&role_id) {
            return Err(StoreError::NotFound(format!("role {}", role_id)));
        }
        if !tables.rules.contains_key(&rule_id) {
            return Err(StoreError::NotFound(format!("rule {}", rule_id)));
        }

        let row = RoleRule::new(role_id, rule_id);
        tables.role_rules.push(row);
        Ok(row)
    }

    async fn rules_for_role(&self, role_id: RoleId) -> StoreResult<Vec<RoleRule>> {
        self.fault(StoreOp::ListRoleRules).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .role_rules
            .iter()
            .filter(|row| row.role_id == role_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl UserRoleStore for MemoryStore {
    async fn assign_user(&self, role_id: RoleId, user_id: UserId) -> StoreResult<UserRole> {
        self.fault(StoreOp::AssignUser).await?;
        let mut tables = self.tables.write().await;

        if !tables.roles.contains_key(&role_id) {
            return Err(StoreError::NotFound(format!("role {}", role_id)));
        }

        let row = UserRole::new(role_id, user_id);
        tables.user_roles.push(row);
        Ok(row)
    }

    async fn users_for_role(&self, role_id: RoleId) -> StoreResult<Vec<UserRole>> {
        self.fault(StoreOp::ListUserRoles).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|row| row.role_id == role_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        self.fault(StoreOp::Begin).await?;
        let guard = self.tables.clone().write_owned().await;
        let staged = (*guard).clone();
        Ok(Box::new(MemoryTransaction {
            guard: Some(guard),
            staged,
            faults: self.faults.clone(),
        }))
    }
}

/// Transaction over the in-memory tables.
///
/// Holds the store's write lock until committed, rolled back or dropped.
struct MemoryTransaction {
    guard: Option<OwnedRwLockWriteGuard<Tables>>,
    staged: Tables,
    faults: Faults,
}

impl MemoryTransaction {
    async fn open(&mut self, op: StoreOp) -> StoreResult<&mut Tables> {
        if self.guard.is_none() {
            return Err(StoreError::TransactionClosed);
        }
        check_fault(&self.faults, op).await?;
        Ok(&mut self.staged)
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn delete_role_rules(&mut self, role_id: RoleId) -> StoreResult<u64> {
        let tables = self.open(StoreOp::TxDeleteRoleRules).await?;
        Ok(tables.delete_role_rules(role_id))
    }

    async fn delete_user_roles(&mut self, role_id: RoleId) -> StoreResult<u64> {
        let tables = self.open(StoreOp::TxDeleteUserRoles).await?;
        Ok(tables.delete_user_roles(role_id))
    }

    async fn delete_roles(&mut self, condition: &Condition<RoleColumn>) -> StoreResult<u64> {
        let tables = self.open(StoreOp::TxDeleteRoles).await?;
        Ok(tables.delete_roles(condition))
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.open(StoreOp::Commit).await?;
        let Some(mut guard) = self.guard.take() else {
            return Err(StoreError::TransactionClosed);
        };
        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        if self.guard.take().is_none() {
            return Err(StoreError::TransactionClosed);
        }
        self.staged = Tables::default();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rbac_model::Status;
    use std::time::Duration;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_subsystem(Subsystem::new(1, "admin")).await;
        store
            .insert_subsystem(Subsystem::new(2, "legacy").deactivated())
            .await;
        store.insert_rule(Rule::new(3, 1, "user:create")).await;
        store.insert_rule(Rule::new(5, 1, "user:delete")).await;
        store
    }

    #[tokio::test]
    async fn test_subsystem_registry() {
        let store = seeded().await;
        assert!(store.is_active(1).await.unwrap());
        assert!(!store.is_active(2).await.unwrap());
        assert!(store.exists(2).await.unwrap());
        assert!(!store.exists(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_role_allocates_ids_and_enforces_unique_name() {
        let store = seeded().await;
        let first = store.insert_role(NewRole::new(1, "ops")).await.unwrap();
        let second = store.insert_role(NewRole::new(1, "dev")).await.unwrap();
        assert_eq!(first.role_id, 1);
        assert_eq!(second.role_id, 2);

        let dup = store.insert_role(NewRole::new(1, "ops")).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        // Same name in another subsystem is fine.
        assert!(store.insert_role(NewRole::new(2, "ops")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_conflict_writes_nothing() {
        let store = seeded().await;
        store.insert_role(NewRole::new(1, "a")).await.unwrap();
        store.insert_role(NewRole::new(1, "b")).await.unwrap();

        let result = store
            .update_roles(
                &Condition::new().eq(RoleColumn::SystemId, 1),
                &RolePatch::new().name("same"),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let names: Vec<String> = store
            .find_roles(&Condition::new())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let store = seeded().await;
        for name in ["a", "b", "c", "d", "e"] {
            store.insert_role(NewRole::new(1, name)).await.unwrap();
        }
        let all = Condition::new();
        let window = store.list_roles(&all, 1, 2).await.unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].name, "b");
        assert_eq!(store.count_roles(&all).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_assign_requires_existing_rows() {
        let store = seeded().await;
        let role = store.insert_role(NewRole::new(1, "ops")).await.unwrap();

        assert!(store.assign_rule(role.role_id, 3).await.is_ok());
        assert!(matches!(
            store.assign_rule(role.role_id, 404).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.assign_user(404, 10).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transaction_commit_and_rollback() {
        let store = seeded().await;
        let role = store.insert_role(NewRole::new(1, "ops")).await.unwrap();
        store.assign_rule(role.role_id, 3).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.delete_role_rules(role.role_id).await.unwrap(), 1);
        tx.rollback().await.unwrap();
        assert_eq!(store.rules_for_role(role.role_id).await.unwrap().len(), 1);

        let mut tx = store.begin().await.unwrap();
        tx.delete_role_rules(role.role_id).await.unwrap();
        tx.commit().await.unwrap();
        assert!(store.rules_for_role(role.role_id).await.unwrap().is_empty());

        assert_eq!(tx.commit().await, Err(StoreError::TransactionClosed));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = seeded().await;
        let role = store.insert_role(NewRole::new(1, "ops")).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.delete_roles(&Condition::new().eq(RoleColumn::RoleId, role.role_id))
                .await
                .unwrap();
        }

        assert!(store
            .find_role(&Condition::new().eq(RoleColumn::RoleId, role.role_id))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_find_role_returns_first_match() {
        let store = seeded().await;
        store.insert_role(NewRole::new(1, "ops")).await.unwrap();
        store.insert_role(NewRole::new(1, "dev")).await.unwrap();

        let in_admin = Condition::new().eq(RoleColumn::SystemId, 1);
        let found = store.find_role(&in_admin).await.unwrap().unwrap();
        assert_eq!(found.name, "ops");

        let missing = Condition::new().eq(RoleColumn::Name, "nobody");
        assert!(store.find_role(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_transaction_hides_partial_writes() {
        let store = seeded().await;
        let role = store.insert_role(NewRole::new(1, "ops")).await.unwrap();
        store.assign_rule(role.role_id, 3).await.unwrap();
        store.assign_rule(role.role_id, 5).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.delete_role_rules(role.role_id).await.unwrap(), 2);

        let mut reader = {
            let store = store.clone();
            let role_id = role.role_id;
            tokio::spawn(async move { store.rules_for_role(role_id).await })
        };

        // The reader waits on the lock while the transaction is open.
        let waited = tokio::time::timeout(Duration::from_millis(50), &mut reader).await;
        assert!(waited.is_err());
        assert!(!reader.is_finished());

        tx.commit().await.unwrap();
        let rows = reader.await.unwrap().unwrap();
        assert!(rows.is_empty());
        assert!(store.find_role(&Condition::new()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_injected_fault() {
        let store = seeded().await;
        store.inject_fault(StoreOp::FindRules).await;
        assert!(matches!(
            store.find_rules(&Condition::new()).await,
            Err(StoreError::Backend(_))
        ));

        store.clear_faults().await;
        let enabled = Condition::new().eq(RuleColumn::Status, Status::Enabled);
        assert_eq!(store.find_rules(&enabled).await.unwrap().len(), 2);
    }
}
