//! Cascading role deletion
//!
//! Removes a role together with every association row referencing it, in a
//! single transaction: rule grants first, then user assignments, then the
//! role row. Either all three deletes commit or none do.

use rbac_model::{Condition, RoleColumn, RoleId};
use rbac_store::{RbacStore, StoreResult, StoreTransaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RbacResult;

/// Row counts removed by a committed cascade.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeReport {
    /// `RoleRule` rows removed
    pub role_rules: u64,
    /// `UserRole` rows removed
    pub user_roles: u64,
    /// Role rows removed (0 or 1)
    pub roles: u64,
}

impl CascadeReport {
    /// Total rows removed across all tables.
    pub fn total(&self) -> u64 {
        self.role_rules + self.user_roles + self.roles
    }
}

/// Deletes roles together with their associations.
#[derive(Clone)]
pub struct CascadeDeleter {
    store: Arc<dyn RbacStore>,
}

impl std::fmt::Debug for CascadeDeleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeDeleter").finish_non_exhaustive()
    }
}

impl CascadeDeleter {
    pub fn new(store: Arc<dyn RbacStore>) -> Self {
        Self { store }
    }

    /// Delete a role and its associations.
    ///
    /// # Returns
    ///
    /// `true` if the cascade committed, `false` if it was rolled back. A
    /// role that does not exist commits an empty cascade.
    pub async fn delete_role(&self, role_id: RoleId) -> bool {
        match self.try_delete_role(role_id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(role_id, error = %e, "Role deletion rolled back");
                false
            }
        }
    }

    /// Delete a role and its associations, reporting what was removed.
    pub async fn try_delete_role(&self, role_id: RoleId) -> RbacResult<CascadeReport> {
        let mut tx = self.store.begin().await?;

        match Self::cascade(tx.as_mut(), role_id).await {
            Ok(report) => {
                if let Err(e) = tx.commit().await {
                    Self::rollback(tx.as_mut(), role_id).await;
                    return Err(e.into());
                }
                tracing::debug!(
                    role_id,
                    role_rules = report.role_rules,
                    user_roles = report.user_roles,
                    roles = report.roles,
                    "Role deleted with associations"
                );
                Ok(report)
            }
            Err(e) => {
                Self::rollback(tx.as_mut(), role_id).await;
                Err(e.into())
            }
        }
    }

    async fn cascade(tx: &mut dyn StoreTransaction, role_id: RoleId) -> StoreResult<CascadeReport> {
        let role_rules = tx.delete_role_rules(role_id).await?;
        let user_roles = tx.delete_user_roles(role_id).await?;
        let roles = tx
            .delete_roles(&Condition::new().eq(RoleColumn::RoleId, role_id))
            .await?;

        Ok(CascadeReport {
            role_rules,
            user_roles,
            roles,
        })
    }

    async fn rollback(tx: &mut dyn StoreTransaction, role_id: RoleId) {
        if let Err(e) = tx.rollback().await {
            // The store discards the transaction when it is dropped.
            tracing::warn!(role_id, error = %e, "Explicit rollback failed");
        }
    }
}
