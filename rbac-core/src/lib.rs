//! # RBAC Core
//!
//! This crate provides the authorization core: access resolution for roles
//! and cascading role deletion, plus the role management operations that sit
//! next to them.
//!
//! ## Overview
//!
//! The rbac-core crate handles:
//! - **Access Resolver**: deduplicated, filtered permission sets for a role
//! - **Cascade Deletion**: atomic removal of a role and its associations
//! - **Role Service**: creation, bulk update/delete, lookup and listing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rbac_core::{AccessQuery, RbacConfig, RbacCore};
//! use rbac_model::{NewRole, Rule, Subsystem};
//! use rbac_store::{MemoryStore, RoleRuleStore};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     store.insert_subsystem(Subsystem::new(1, "admin")).await;
//!     store.insert_rule(Rule::new(3, 1, "user:create")).await;
//!
//!     let core = RbacCore::new(Arc::new(store.clone()), RbacConfig::default());
//!     let role = core.roles().try_add_role(NewRole::new(1, "operator")).await.unwrap();
//!     store.assign_rule(role.role_id, 3).await.unwrap();
//!
//!     let access = core.resolve_access(&AccessQuery::new(role.role_id, 1)).await;
//!     assert!(access.allows("user:create"));
//!
//!     assert!(core.delete_role(role.role_id).await);
//! }
//! ```
//!
//! ## Error Policy
//!
//! - Resolution fails soft: storage errors yield an empty set.
//! - Cascade deletion rolls back on any error and reports `false`.
//! - Creation reports `false`; `try_add_role` exposes the typed error.
//! - Bulk operations return [`RbacResult`].

pub mod access;
pub mod cascade;
pub mod config;
pub mod error;
pub mod page;
pub mod roles;

use rbac_model::{Condition, NewRole, Role, RoleColumn, RoleId, RolePatch};
use rbac_store::RbacStore;
use std::sync::Arc;

// Re-export main types for convenience
pub use access::{AccessQuery, AccessResolver, AccessSet};
pub use cascade::{CascadeDeleter, CascadeReport};
pub use config::{ConfigError, RbacConfig};
pub use error::{RbacError, RbacResult};
pub use page::Page;
pub use roles::RoleService;

/// Entry point bundling the resolver, the cascade coordinator and the role
/// service over one shared store.
#[derive(Debug, Clone)]
pub struct RbacCore {
    resolver: AccessResolver,
    cascade: CascadeDeleter,
    roles: RoleService,
}

impl RbacCore {
    /// Build a core from a configuration that is already known to be valid,
    /// such as [`RbacConfig::default`] or the result of [`RbacConfig::from_env`].
    pub fn new(store: Arc<dyn RbacStore>, config: RbacConfig) -> Self {
        Self {
            resolver: AccessResolver::new(store.clone()),
            cascade: CascadeDeleter::new(store.clone()),
            roles: RoleService::new(store, config),
        }
    }

    /// Build a core after validating `config`.
    pub fn try_new(store: Arc<dyn RbacStore>, config: RbacConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(store, config))
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    pub fn cascade(&self) -> &CascadeDeleter {
        &self.cascade
    }

    pub fn roles(&self) -> &RoleService {
        &self.roles
    }

    /// Permission set granted by a role. Never fails; see [`AccessResolver::resolve`].
    pub async fn resolve_access(&self, query: &AccessQuery) -> AccessSet {
        self.resolver.resolve(query).await
    }

    /// Delete a role with its associations. See [`CascadeDeleter::delete_role`].
    pub async fn delete_role(&self, role_id: RoleId) -> bool {
        self.cascade.delete_role(role_id).await
    }

    /// Create a role. See [`RoleService::add_role`].
    pub async fn add_role(&self, new_role: NewRole) -> bool {
        self.roles.add_role(new_role).await
    }

    /// Bulk update without cascade. See [`RoleService::update_by_condition`].
    pub async fn update_by_condition(
        &self,
        condition: &Condition<RoleColumn>,
        patch: &RolePatch,
    ) -> RbacResult<u64> {
        self.roles.update_by_condition(condition, patch).await
    }

    /// Bulk delete without cascade. See [`RoleService::delete_by_condition`].
    pub async fn delete_by_condition(&self, condition: &Condition<RoleColumn>) -> RbacResult<u64> {
        self.roles.delete_by_condition(condition).await
    }

    /// One page of roles. See [`RoleService::list_page`].
    pub async fn list_page(
        &self,
        page: i64,
        limit: i64,
        condition: &Condition<RoleColumn>,
    ) -> RbacResult<Page<Role>> {
        self.roles.list_page(page, limit, condition).await
    }
}
