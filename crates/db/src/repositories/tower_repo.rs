//! Repository for the `towers` table.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{CreateTower, Tower, UpdateTower};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, floors, description, is_active, created_at, updated_at";

/// Provides CRUD operations for towers.
pub struct TowerRepo;

impl TowerRepo {
    pub async fn create(pool: &PgPool, input: &CreateTower) -> Result<Tower, sqlx::Error> {
        let query = format!(
            "INSERT INTO towers (name, floors, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tower>(&query)
            .bind(&input.name)
            .bind(input.floors)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tower>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM towers WHERE id = $1");
        sqlx::query_as::<_, Tower>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List towers ordered by name.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Tower>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM towers ORDER BY name LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Tower>(&query)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update a tower. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTower,
    ) -> Result<Option<Tower>, sqlx::Error> {
        let query = format!(
            "UPDATE towers SET
                name = COALESCE($2, name),
                floors = COALESCE($3, floors),
                description = COALESCE($4, description),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tower>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.floors)
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Highest floor used by any apartment of the tower, if it has any.
    pub async fn highest_used_floor(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(floor) FROM apartments WHERE tower_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a tower and, through the cascade, its apartments.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM towers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
