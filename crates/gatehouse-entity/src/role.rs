//! RBAC entity models.
//!
//! Classic many-to-many graph: permissions are granted to roles, roles to
//! accounts. `(account, role)` and `(role, permission)` pairs are unique
//! at the schema level; assigning an existing pair is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named role grantable to accounts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Row identifier.
    pub id: Uuid,
    /// Unique role name, e.g. `"user"` or `"admin"`.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A named permission grantable to roles.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Row identifier.
    pub id: Uuid,
    /// Unique permission name, e.g. `"users:read"`.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// When the permission was created.
    pub created_at: DateTime<Utc>,
}
