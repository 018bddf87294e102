//! Role, module and permission models.

use conjunto_core::roles::permission_code;
use conjunto_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Created by migrations; cannot be deleted.
    pub is_system: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A role together with the permission codes it grants.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}

/// DTO for creating a role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<DbId>,
}

/// Replacement permission set for a role.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRolePermissions {
    pub permission_ids: Vec<DbId>,
}

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub id: i16,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `permissions` table joined with its module code.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub module_id: i16,
    pub module_code: String,
    pub action: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Permission {
    /// The `"<module>:<action>"` code carried in access tokens.
    pub fn code(&self) -> String {
        permission_code(&self.module_code, &self.action)
    }
}
