//! Integration tests for role creation, bulk operations and cascade deletion.
//!
//! Test workflows:
//! 1. Cascade deletion removes the role and every association row
//! 2. A failure mid-cascade rolls everything back
//! 3. Duplicate names are rejected per subsystem
//! 4. Bulk delete by condition does not cascade
//! 5. Pagination falls back to the default page size
//! 6. Configured limits are validated before use

use rbac_core::{AccessQuery, ConfigError, RbacConfig, RbacCore, RbacError};
use rbac_model::{
    Condition, NewRole, RoleColumn, RoleId, RolePatch, Rule, Status, Subsystem, ValidationError,
};
use rbac_store::{MemoryStore, RoleRuleStore, RoleStore, StoreError, StoreOp, UserRoleStore};
use std::sync::Arc;

/// Test fixture with one active subsystem and four rules.
struct TestFixture {
    /// Backing store, shared with `core`.
    store: MemoryStore,
    /// Core under test.
    core: RbacCore,
}

impl TestFixture {
    async fn new() -> Self {
        let store = MemoryStore::new();
        store.insert_subsystem(Subsystem::new(1, "admin")).await;
        for (rule_id, name) in [(1, "a:read"), (2, "a:write"), (3, "b:read"), (4, "b:write")] {
            store.insert_rule(Rule::new(rule_id, 1, name)).await;
        }

        let core = RbacCore::new(Arc::new(store.clone()), RbacConfig::default());
        Self { store, core }
    }

    /// Role with four rule grants and two user assignments.
    async fn populated_role(&self, name: &str) -> RoleId {
        let role = self
            .core
            .roles()
            .try_add_role(NewRole::new(1, name))
            .await
            .unwrap();
        for rule_id in 1..=4 {
            self.store.assign_rule(role.role_id, rule_id).await.unwrap();
        }
        for user_id in [100, 200] {
            self.store.assign_user(role.role_id, user_id).await.unwrap();
        }
        role.role_id
    }

    async fn role_exists(&self, role_id: RoleId) -> bool {
        self.core.roles().get_role(role_id).await.unwrap().is_some()
    }

    async fn association_counts(&self, role_id: RoleId) -> (usize, usize) {
        (
            self.store.rules_for_role(role_id).await.unwrap().len(),
            self.store.users_for_role(role_id).await.unwrap().len(),
        )
    }
}

#[tokio::test]
async fn test_delete_role_removes_all_references() {
    let fixture = TestFixture::new().await;
    let role_id = fixture.populated_role("operator").await;
    let other = fixture.populated_role("auditor").await;
    assert_eq!(fixture.association_counts(role_id).await, (4, 2));

    assert!(fixture.core.delete_role(role_id).await);

    assert!(!fixture.role_exists(role_id).await);
    assert_eq!(fixture.association_counts(role_id).await, (0, 0));

    // Other roles keep their rows.
    assert!(fixture.role_exists(other).await);
    assert_eq!(fixture.association_counts(other).await, (4, 2));
}

#[tokio::test]
async fn test_failed_user_role_delete_rolls_back_cascade() {
    let fixture = TestFixture::new().await;
    let role_id = fixture.populated_role("operator").await;
    fixture.store.inject_fault(StoreOp::TxDeleteUserRoles).await;

    assert!(!fixture.core.delete_role(role_id).await);

    assert!(fixture.role_exists(role_id).await);
    assert_eq!(fixture.association_counts(role_id).await, (4, 2));
    assert_eq!(
        fixture
            .core
            .resolve_access(&AccessQuery::new(role_id, 1))
            .await
            .len(),
        4
    );

    fixture.store.clear_faults().await;
    assert!(fixture.core.delete_role(role_id).await);
    assert!(!fixture.role_exists(role_id).await);
}

#[tokio::test]
async fn test_failed_role_row_delete_rolls_back_cascade() {
    let fixture = TestFixture::new().await;
    let role_id = fixture.populated_role("operator").await;
    fixture.store.inject_fault(StoreOp::TxDeleteRoles).await;

    let err = fixture
        .core
        .cascade()
        .try_delete_role(role_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::Storage(StoreError::Backend(_))));

    assert!(fixture.role_exists(role_id).await);
    assert_eq!(fixture.association_counts(role_id).await, (4, 2));
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let fixture = TestFixture::new().await;

    assert!(fixture.core.add_role(NewRole::new(1, "X")).await);
    assert!(!fixture.core.add_role(NewRole::new(1, "X")).await);

    let same_name = Condition::new()
        .eq(RoleColumn::Name, "X")
        .eq(RoleColumn::SystemId, 1);
    assert_eq!(fixture.core.roles().find_roles(&same_name).await.unwrap().len(), 1);

    let err = fixture
        .core
        .roles()
        .try_add_role(NewRole::new(1, "X"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RbacError::Validation(ValidationError::DuplicateName { system_id: 1, .. })
    ));
}

#[tokio::test]
async fn test_same_name_allowed_in_other_subsystem() {
    let fixture = TestFixture::new().await;
    fixture.store.insert_subsystem(Subsystem::new(2, "shop")).await;

    assert!(fixture.core.add_role(NewRole::new(1, "manager")).await);
    assert!(fixture.core.add_role(NewRole::new(2, "manager")).await);
}

#[tokio::test]
async fn test_add_role_rejects_invalid_input_without_writing() {
    let fixture = TestFixture::new().await;

    assert!(!fixture.core.add_role(NewRole::new(1, "n".repeat(51))).await);
    assert!(!fixture.core.add_role(NewRole::new(1, "ok").with_remark("r".repeat(51))).await);
    assert!(!fixture.core.add_role(NewRole::new(77, "ok")).await);

    fixture.store.inject_fault(StoreOp::InsertRole).await;
    assert!(!fixture.core.add_role(NewRole::new(1, "ok")).await);

    assert_eq!(fixture.store.count_roles(&Condition::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_inactive_subsystem_still_accepts_roles() {
    let fixture = TestFixture::new().await;
    fixture
        .store
        .insert_subsystem(Subsystem::new(5, "archived").deactivated())
        .await;

    // Creation only requires the subsystem to exist.
    assert!(fixture.core.add_role(NewRole::new(5, "keeper")).await);
}

#[tokio::test]
async fn test_delete_by_condition_does_not_cascade() {
    let fixture = TestFixture::new().await;
    let role_id = fixture.populated_role("operator").await;

    let by_id = Condition::new().eq(RoleColumn::RoleId, role_id);
    assert_eq!(fixture.core.delete_by_condition(&by_id).await.unwrap(), 1);

    assert!(!fixture.role_exists(role_id).await);
    assert_eq!(fixture.association_counts(role_id).await, (4, 2));

    // Orphaned grants no longer resolve to anything.
    assert!(fixture
        .core
        .resolve_access(&AccessQuery::new(role_id, 1))
        .await
        .is_empty());
}

#[tokio::test]
async fn test_update_by_condition() {
    let fixture = TestFixture::new().await;
    for name in ["a", "b", "c"] {
        fixture.core.add_role(NewRole::new(1, name)).await;
    }

    let some = Condition::new().is_in(RoleColumn::Name, ["a", "b"]);
    let disable = RolePatch::new().status(Status::Disabled);
    assert_eq!(fixture.core.update_by_condition(&some, &disable).await.unwrap(), 2);

    let disabled = Condition::new().eq(RoleColumn::Status, Status::Disabled);
    assert_eq!(fixture.store.count_roles(&disabled).await.unwrap(), 2);

    let too_long = RolePatch::new().remark(Some("r".repeat(51)));
    assert!(matches!(
        fixture.core.update_by_condition(&some, &too_long).await,
        Err(RbacError::Validation(ValidationError::TooLong { field: "remark", .. }))
    ));

    let rename_all = RolePatch::new().name("same");
    assert!(matches!(
        fixture.core.update_by_condition(&Condition::new(), &rename_all).await,
        Err(RbacError::Storage(StoreError::Conflict(_)))
    ));
}

#[tokio::test]
async fn test_negative_limit_uses_default_page_size() {
    let fixture = TestFixture::new().await;
    for i in 0..25 {
        fixture.core.add_role(NewRole::new(1, format!("role-{:02}", i))).await;
    }

    let page = fixture
        .core
        .list_page(1, -5, &Condition::new())
        .await
        .unwrap();
    assert_eq!(page.limit, 20);
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.total_count, 25);
    assert_eq!(page.page_count(), 2);

    let second = fixture
        .core
        .list_page(2, -5, &Condition::new())
        .await
        .unwrap();
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.items[0].name, "role-20");
}

#[tokio::test]
async fn test_total_count_ignores_window() {
    let fixture = TestFixture::new().await;
    for i in 0..6 {
        let status = if i % 2 == 0 { Status::Enabled } else { Status::Disabled };
        fixture
            .core
            .add_role(NewRole::new(1, format!("r{}", i)).with_status(status))
            .await;
    }

    let enabled = Condition::new().eq(RoleColumn::Status, Status::Enabled);
    let page = fixture.core.list_page(1, 2, &enabled).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_count, 3);

    let empty = fixture.core.list_page(1, 0, &enabled).await.unwrap();
    assert!(empty.items.is_empty());
    assert_eq!(empty.total_count, 3);
}

#[tokio::test]
async fn test_configured_page_size_drives_negative_limit_fallback() {
    let fixture = TestFixture::new().await;
    let config = RbacConfig::from_lookup(|key| {
        (key == "RBAC_DEFAULT_PAGE_LIMIT").then(|| "3".to_string())
    })
    .unwrap();
    let core = RbacCore::try_new(Arc::new(fixture.store.clone()), config).unwrap();
    for name in ["a", "b", "c", "d", "e"] {
        assert!(core.add_role(NewRole::new(1, name)).await);
    }

    let page = core.list_page(1, -5, &Condition::new()).await.unwrap();
    assert_eq!(page.limit, 3);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_count, 5);
}

#[tokio::test]
async fn test_zero_limits_are_rejected() {
    let fixture = TestFixture::new().await;

    let from_vars = RbacConfig::from_lookup(|key| {
        (key == "RBAC_DEFAULT_PAGE_LIMIT").then(|| "0".to_string())
    });
    assert!(matches!(from_vars, Err(ConfigError::InvalidValue { .. })));

    let zero_names = RbacConfig {
        name_max_len: 0,
        ..RbacConfig::default()
    };
    assert!(RbacCore::try_new(Arc::new(fixture.store.clone()), zero_names).is_err());
}
