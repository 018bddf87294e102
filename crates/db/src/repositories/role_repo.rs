//! Repositories for `roles`, `modules`, `permissions` and `role_permissions`.

use conjunto_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateRole, Module, Permission, Role};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, is_system, created_at, updated_at";

/// Provides access to roles and their permission grants.
pub struct RoleRepo;

impl RoleRepo {
    /// List all roles ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY name");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a role id to its name. Fails with `RowNotFound` for unknown ids.
    pub async fn resolve_name(pool: &PgPool, id: DbId) -> Result<String, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Permission codes (`"<module>:<action>"`) granted to a role through
    /// active modules.
    pub async fn permission_codes(pool: &PgPool, role_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT m.code || ':' || p.action
             FROM role_permissions rp
             JOIN permissions p ON p.id = rp.permission_id
             JOIN modules m ON m.id = p.module_id
             WHERE rp.role_id = $1 AND m.is_active
             ORDER BY 1",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Insert a role and its initial permission set in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO roles (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, unnest($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(role.id)
        .bind(&input.permission_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(role)
    }

    /// Replace the permission set of a role.
    ///
    /// Returns `false` if the role does not exist.
    pub async fn set_permissions(
        pool: &PgPool,
        role_id: DbId,
        permission_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let touched = sqlx::query("UPDATE roles SET updated_at = NOW() WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, unnest($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a non-system role. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while users still hold the role.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1 AND NOT is_system")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Read access to application modules.
pub struct ModuleRepo;

impl ModuleRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Module>, sqlx::Error> {
        sqlx::query_as::<_, Module>(
            "SELECT id, code, name, description, is_active, created_at, updated_at
             FROM modules ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }
}

/// Read access to the permission catalogue.
pub struct PermissionRepo;

impl PermissionRepo {
    /// All permissions with their module code, grouped by module.
    pub async fn list(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.module_id, m.code AS module_code, p.action, p.description,
                    p.created_at, p.updated_at
             FROM permissions p
             JOIN modules m ON m.id = p.module_id
             ORDER BY m.id, p.id",
        )
        .fetch_all(pool)
        .await
    }
}
