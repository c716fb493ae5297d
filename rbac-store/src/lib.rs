//! # RBAC Store
//!
//! This crate provides the persistence seams of the RBAC core: one async
//! repository trait per entity, a transactional trait for multi-write
//! operations, and an in-memory backend.
//!
//! ## Overview
//!
//! The rbac-store crate handles:
//! - **Subsystem Registry**: existence and activity checks for subsystems
//! - **Role / Rule Stores**: condition-filtered queries and bulk writes
//! - **Association Stores**: `RoleRule` and `UserRole` join rows
//! - **Transactions**: grouped deletes with commit/rollback
//!
//! ## Features
//!
//! - `memory` (default): In-memory store for tests and single-process use
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rbac_model::{Condition, NewRole, RoleColumn, Rule, Subsystem};
//! use rbac_store::{MemoryStore, RoleStore};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     store.insert_subsystem(Subsystem::new(1, "admin")).await;
//!     store.insert_rule(Rule::new(3, 1, "user:create")).await;
//!
//!     let role = store.insert_role(NewRole::new(1, "operator")).await.unwrap();
//!     let found = store
//!         .find_role(&Condition::new().eq(RoleColumn::RoleId, role.role_id))
//!         .await
//!         .unwrap();
//!     assert!(found.is_some());
//! }
//! ```
//!
//! ## Transactions
//!
//! Backends implement [`TransactionalStore`]. A transaction that is dropped
//! without `commit` is rolled back.

pub mod error;
pub mod repository;

#[cfg(feature = "memory")]
pub mod memory;

// Re-export main types
pub use error::{StoreError, StoreResult};
pub use repository::{
    RbacStore, RoleRuleStore, RoleStore, RuleStore, StoreTransaction, SubsystemRegistry,
    TransactionalStore, UserRoleStore,
};

#[cfg(feature = "memory")]
pub use memory::{MemoryStore, StoreOp};
