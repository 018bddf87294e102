//! Repository for the `apartments` table.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{Apartment, CreateApartment, UpdateApartment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tower_id, number, floor, area_m2, bedrooms, bathrooms, occupancy, \
                       owner_id, monthly_fee, created_at, updated_at";

/// Provides CRUD operations for apartments, always scoped to a tower.
pub struct ApartmentRepo;

impl ApartmentRepo {
    /// Insert a new apartment in `tower_id`.
    pub async fn create(
        pool: &PgPool,
        tower_id: DbId,
        input: &CreateApartment,
    ) -> Result<Apartment, sqlx::Error> {
        let query = format!(
            "INSERT INTO apartments
                (tower_id, number, floor, area_m2, bedrooms, bathrooms, occupancy, owner_id, monthly_fee)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), COALESCE($7, 'vacant'), $8,
                     COALESCE($9, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Apartment>(&query)
            .bind(tower_id)
            .bind(&input.number)
            .bind(input.floor)
            .bind(input.area_m2)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(&input.occupancy)
            .bind(input.owner_id)
            .bind(input.monthly_fee)
            .fetch_one(pool)
            .await
    }

    /// Find an apartment by ID within a tower.
    pub async fn find_in_tower(
        pool: &PgPool,
        tower_id: DbId,
        id: DbId,
    ) -> Result<Option<Apartment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM apartments WHERE id = $1 AND tower_id = $2");
        sqlx::query_as::<_, Apartment>(&query)
            .bind(id)
            .bind(tower_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Apartment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM apartments WHERE id = $1");
        sqlx::query_as::<_, Apartment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the apartments of a tower by floor, then number.
    pub async fn list_by_tower(
        pool: &PgPool,
        tower_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Apartment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM apartments
             WHERE tower_id = $1
             ORDER BY floor, number
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Apartment>(&query)
            .bind(tower_id)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update an apartment. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the apartment does not exist in the tower.
    pub async fn update(
        pool: &PgPool,
        tower_id: DbId,
        id: DbId,
        input: &UpdateApartment,
    ) -> Result<Option<Apartment>, sqlx::Error> {
        let query = format!(
            "UPDATE apartments SET
                number = COALESCE($3, number),
                floor = COALESCE($4, floor),
                area_m2 = COALESCE($5, area_m2),
                bedrooms = COALESCE($6, bedrooms),
                bathrooms = COALESCE($7, bathrooms),
                occupancy = COALESCE($8, occupancy),
                owner_id = COALESCE($9, owner_id),
                monthly_fee = COALESCE($10, monthly_fee)
             WHERE id = $1 AND tower_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Apartment>(&query)
            .bind(id)
            .bind(tower_id)
            .bind(&input.number)
            .bind(input.floor)
            .bind(input.area_m2)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(&input.occupancy)
            .bind(input.owner_id)
            .bind(input.monthly_fee)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, tower_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM apartments WHERE id = $1 AND tower_id = $2")
            .bind(id)
            .bind(tower_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
