//! RBAC repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::role::{Permission, Role};

/// Repository for roles, permissions, and their assignments.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find role by name", e)
            })
    }

    /// All roles held by an account.
    pub async fn roles_for_account(&self, account_id: Uuid) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r \
             JOIN account_roles ar ON ar.role_id = r.id \
             WHERE ar.account_id = $1 \
             ORDER BY r.name",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve account roles", e)
        })
    }

    /// All permissions held by an account, flattened through its roles.
    pub async fn permissions_for_account(&self, account_id: Uuid) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT DISTINCT p.* FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             JOIN account_roles ar ON ar.role_id = rp.role_id \
             WHERE ar.account_id = $1 \
             ORDER BY p.name",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to resolve account permissions",
                e,
            )
        })
    }

    /// Assign a role to an account. Idempotent: the unique
    /// `(account_id, role_id)` pair makes re-assignment a no-op.
    pub async fn assign(&self, account_id: Uuid, role_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO account_roles (account_id, role_id) VALUES ($1, $2) \
             ON CONFLICT (account_id, role_id) DO NOTHING",
        )
        .bind(account_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign role", e))?;
        Ok(())
    }

    /// Remove a role assignment. Removing an absent pair is a no-op.
    pub async fn unassign(&self, account_id: Uuid, role_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM account_roles WHERE account_id = $1 AND role_id = $2")
            .bind(account_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove role", e))?;
        Ok(())
    }
}
