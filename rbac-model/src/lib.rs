//! # RBAC Model
//!
//! This crate provides the data model of the RBAC core: subsystems, roles,
//! rules (permission nodes) and the association rows that link roles to
//! rules and to users.
//!
//! ## Overview
//!
//! The rbac-model crate handles:
//! - **Subsystems**: Namespaces that partition roles and rules
//! - **Roles**: Named permission bundles scoped to a subsystem
//! - **Rules**: Single permission nodes scoped to a subsystem
//! - **Associations**: `RoleRule` and `UserRole` join rows
//! - **Conditions**: Typed equality / `IN` filters over entity columns
//!
//! ## Architecture
//!
//! ```text
//! Subsystem
//!   ├─ Role ──┬─ RoleRule ─→ Rule
//!   │         └─ UserRole ─→ user
//!   └─ Rule
//! ```
//!
//! ## Usage
//!
//! ```
//! use rbac_model::{Condition, NewRole, RoleColumn, Status};
//!
//! let role = NewRole::new(1, "auditor").with_remark("read-only staff");
//! assert!(role.validate(&Default::default()).is_ok());
//!
//! let enabled_in_system = Condition::new()
//!     .eq(RoleColumn::SystemId, 1)
//!     .eq(RoleColumn::Status, Status::Enabled);
//! assert_eq!(enabled_in_system.len(), 2);
//! ```

pub mod association;
pub mod condition;
pub mod error;
pub mod role;
pub mod rule;
pub mod status;
pub mod subsystem;
pub mod value;

/// Identifier of a role row.
pub type RoleId = i64;

/// Identifier of a rule (permission node) row.
pub type RuleId = i64;

/// Identifier of a subsystem.
pub type SystemId = i64;

/// Identifier of a user, as stored in `UserRole` rows.
pub type UserId = i64;

// Re-export main types for convenience
pub use association::{RoleRule, UserRole};
pub use condition::{Clause, Condition, Predicate, Record};
pub use error::ValidationError;
pub use role::{FieldLimits, NewRole, Role, RoleColumn, RoleOption, RolePatch};
pub use rule::{Rule, RuleColumn};
pub use status::Status;
pub use subsystem::Subsystem;
pub use value::Value;
