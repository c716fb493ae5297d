//! Role service
//!
//! Creation, condition-scoped bulk updates and deletes, lookups and paginated
//! listing of roles.
//!
//! Bulk operations here never cascade: [`RoleService::delete_by_condition`]
//! leaves `RoleRule` and `UserRole` rows in place. Use
//! [`CascadeDeleter`](crate::CascadeDeleter) to remove a role together with
//! its associations.

use rbac_model::{
    Condition, NewRole, Role, RoleColumn, RoleId, RoleOption, RolePatch, Status, ValidationError,
};
use rbac_store::RbacStore;
use std::sync::Arc;

use crate::config::RbacConfig;
use crate::error::RbacResult;
use crate::page::Page;

/// Role operations over a store.
#[derive(Clone)]
pub struct RoleService {
    store: Arc<dyn RbacStore>,
    config: RbacConfig,
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RoleService {
    pub fn new(store: Arc<dyn RbacStore>, config: RbacConfig) -> Self {
        Self { store, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    /// Create a role.
    ///
    /// # Returns
    ///
    /// `true` if the role was stored. Validation and storage failures are
    /// logged and reported as `false`.
    pub async fn add_role(&self, new_role: NewRole) -> bool {
        match self.try_add_role(new_role).await {
            Ok(_) => true,
            Err(e) if e.is_server_error() => {
                tracing::error!(error = %e, "Role creation failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Role creation rejected");
                false
            }
        }
    }

    /// Create a role, returning the stored row.
    ///
    /// Checks, in order: required fields and length bounds, subsystem
    /// existence, `(system_id, name)` uniqueness.
    pub async fn try_add_role(&self, new_role: NewRole) -> RbacResult<Role> {
        new_role.validate(&self.config.field_limits())?;

        if !self.store.exists(new_role.system_id).await? {
            return Err(ValidationError::UnknownSubsystem(new_role.system_id).into());
        }

        let same_name = Condition::new()
            .eq(RoleColumn::Name, new_role.name.as_str())
            .eq(RoleColumn::SystemId, new_role.system_id);
        if self.store.find_role(&same_name).await?.is_some() {
            return Err(ValidationError::DuplicateName {
                name: new_role.name,
                system_id: new_role.system_id,
            }
            .into());
        }

        let role = self.store.insert_role(new_role).await?;
        tracing::debug!(role_id = role.role_id, system_id = role.system_id, "Role created");
        Ok(role)
    }

    /// Apply a patch to every role matching the condition.
    ///
    /// # Returns
    ///
    /// Number of roles affected. An empty patch affects nothing.
    pub async fn update_by_condition(
        &self,
        condition: &Condition<RoleColumn>,
        patch: &RolePatch,
    ) -> RbacResult<u64> {
        patch.validate(&self.config.field_limits())?;
        if patch.is_empty() {
            return Ok(0);
        }

        let affected = self.store.update_roles(condition, patch).await?;
        tracing::debug!(affected, "Roles updated by condition");
        Ok(affected)
    }

    /// Apply a patch to a single role.
    pub async fn update_role(&self, role_id: RoleId, patch: &RolePatch) -> RbacResult<u64> {
        self.update_by_condition(&Condition::new().eq(RoleColumn::RoleId, role_id), patch)
            .await
    }

    /// Delete every role matching the condition, without cascading.
    ///
    /// # Returns
    ///
    /// Number of roles deleted.
    pub async fn delete_by_condition(&self, condition: &Condition<RoleColumn>) -> RbacResult<u64> {
        let affected = self.store.delete_roles(condition).await?;
        tracing::debug!(affected, "Roles deleted by condition");
        Ok(affected)
    }

    /// Look up a role by id.
    pub async fn get_role(&self, role_id: RoleId) -> RbacResult<Option<Role>> {
        let condition = Condition::new().eq(RoleColumn::RoleId, role_id);
        Ok(self.store.find_role(&condition).await?)
    }

    /// All roles matching the condition, in `role_id` order.
    pub async fn find_roles(&self, condition: &Condition<RoleColumn>) -> RbacResult<Vec<Role>> {
        Ok(self.store.find_roles(condition).await?)
    }

    /// `(role_id, name)` entries of matching roles, for selection lists.
    pub async fn role_options(
        &self,
        condition: &Condition<RoleColumn>,
    ) -> RbacResult<Vec<RoleOption>> {
        let roles = self.store.find_roles(condition).await?;
        Ok(roles.iter().map(Role::to_option).collect())
    }

    /// Selection list entries of all enabled roles.
    pub async fn enabled_role_options(&self) -> RbacResult<Vec<RoleOption>> {
        self.role_options(&Condition::new().eq(RoleColumn::Status, Status::Enabled))
            .await
    }

    /// One page of matching roles.
    ///
    /// `page` is 1-indexed; values below 1 are treated as 1. A negative
    /// `limit` falls back to the configured default page size.
    pub async fn list_page(
        &self,
        page: i64,
        limit: i64,
        condition: &Condition<RoleColumn>,
    ) -> RbacResult<Page<Role>> {
        let limit = u64::try_from(limit).unwrap_or(self.config.default_page_limit);
        let page = u64::try_from(page).unwrap_or(1).max(1);
        let offset = (page - 1).saturating_mul(limit);

        let total_count = self.store.count_roles(condition).await?;
        let items = self.store.list_roles(condition, offset, limit).await?;

        Ok(Page {
            items,
            total_count,
            page,
            limit,
        })
    }
}
