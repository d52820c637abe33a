//! Role and permission resolution over the RBAC tables.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_database::repositories::RoleRepository;
use gatehouse_entity::role::{Permission, Role};

/// Resolves roles and permissions and manages role assignments.
///
/// Every check goes to the database; role membership changes take
/// effect on the next check without any cache to invalidate.
#[derive(Debug, Clone)]
pub struct RoleAuthority {
    /// RBAC table access.
    role_repo: Arc<RoleRepository>,
}

impl RoleAuthority {
    /// Creates a new role authority.
    pub fn new(role_repo: Arc<RoleRepository>) -> Self {
        Self { role_repo }
    }

    /// Returns every role held by an account.
    pub async fn roles(&self, account_id: Uuid) -> Result<Vec<Role>, AppError> {
        self.role_repo.roles_for_account(account_id).await
    }

    /// Returns every permission an account holds through its roles,
    /// deduplicated.
    pub async fn permissions(&self, account_id: Uuid) -> Result<Vec<Permission>, AppError> {
        self.role_repo.permissions_for_account(account_id).await
    }

    /// Checks whether an account holds the named role.
    pub async fn has_role(&self, account_id: Uuid, role_name: &str) -> Result<bool, AppError> {
        let roles = self.role_repo.roles_for_account(account_id).await?;
        Ok(roles.iter().any(|r| r.name == role_name))
    }

    /// Checks whether an account holds the named permission through any
    /// of its roles.
    pub async fn has_permission(
        &self,
        account_id: Uuid,
        permission_name: &str,
    ) -> Result<bool, AppError> {
        let permissions = self.role_repo.permissions_for_account(account_id).await?;
        Ok(permissions.iter().any(|p| p.name == permission_name))
    }

    /// Assigns the named role to an account. Re-assigning a role the
    /// account already holds is a no-op.
    pub async fn assign_role(&self, account_id: Uuid, role_name: &str) -> Result<(), AppError> {
        let role = self
            .role_repo
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role '{role_name}' not found")))?;

        self.role_repo.assign(account_id, role.id).await?;
        info!(account_id = %account_id, role = %role_name, "Role assigned");
        Ok(())
    }

    /// Removes the named role from an account. Removing a role the
    /// account does not hold is a no-op.
    pub async fn remove_role(&self, account_id: Uuid, role_name: &str) -> Result<(), AppError> {
        let role = self
            .role_repo
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role '{role_name}' not found")))?;

        self.role_repo.unassign(account_id, role.id).await?;
        info!(account_id = %account_id, role = %role_name, "Role removed");
        Ok(())
    }
}
