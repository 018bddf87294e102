//! Database bootstrap: connect, migrate, verify lookup seeds.
//!
//! These tests need a Postgres server reachable through `DATABASE_URL`.

use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_full_bootstrap(pool: PgPool) {
    conjunto_db::health_check(&pool).await.unwrap();

    let tables = ["user_statuses", "modules", "permissions", "roles", "role_permissions"];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }
}

/// Every module gets one permission per action.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_permission_catalog_is_complete(pool: PgPool) {
    let modules = conjunto_db::repositories::ModuleRepo::list(&pool).await.unwrap();
    let permissions = conjunto_db::repositories::PermissionRepo::list(&pool)
        .await
        .unwrap();

    assert_eq!(modules.len(), conjunto_core::roles::VALID_MODULES.len());
    assert_eq!(
        permissions.len(),
        modules.len() * conjunto_core::roles::VALID_ACTIONS.len()
    );
}

/// System roles exist and resolve to permission codes.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_system_roles_have_permissions(pool: PgPool) {
    use conjunto_db::repositories::RoleRepo;

    for name in conjunto_core::roles::SYSTEM_ROLES {
        let role = RoleRepo::find_by_name(&pool, name)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("missing system role {name}"));
        assert!(role.is_system);
        let codes = RoleRepo::permission_codes(&pool, role.id).await.unwrap();
        assert!(!codes.is_empty(), "{name} should have permissions");
    }

    let resident = RoleRepo::find_by_name(&pool, "resident").await.unwrap().unwrap();
    let codes = RoleRepo::permission_codes(&pool, resident.id).await.unwrap();
    assert!(codes.contains(&"pqrs:create".to_string()));
    assert!(!codes.contains(&"users:manage".to_string()));
}
