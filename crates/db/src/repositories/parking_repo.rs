//! Repository for the `parking_spots` table.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::parking::{STATUS_ASSIGNED, STATUS_AVAILABLE};
use conjunto_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::parking::{
    CreateParkingSpot, ParkingFilter, ParkingSpot, UpdateParkingSpot, Vehicle,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, kind, status, apartment_id, vehicle, assigned_at, \
                       created_at, updated_at";

/// Provides CRUD and assignment operations for parking spots.
pub struct ParkingRepo;

impl ParkingRepo {
    /// Insert a new spot. `status` defaults to `available`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateParkingSpot,
    ) -> Result<ParkingSpot, sqlx::Error> {
        let query = format!(
            "INSERT INTO parking_spots (code, kind, status)
             VALUES ($1, $2, COALESCE($3, 'available'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(&input.code)
            .bind(&input.kind)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ParkingSpot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parking_spots WHERE id = $1");
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List spots matching `filter`, ordered by code.
    pub async fn list(
        pool: &PgPool,
        filter: &ParkingFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ParkingSpot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM parking_spots
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR kind = $2)
               AND ($3::BIGINT IS NULL OR apartment_id = $3)
             ORDER BY code
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(&filter.status)
            .bind(&filter.kind)
            .bind(filter.apartment_id)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update code, kind or status. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateParkingSpot,
    ) -> Result<Option<ParkingSpot>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_spots SET
                code = COALESCE($2, code),
                kind = COALESCE($3, kind),
                status = COALESCE($4, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.kind)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Assign an available spot to an apartment.
    ///
    /// Returns `None` if the spot is missing or no longer available.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        apartment_id: DbId,
        vehicle: Option<&Vehicle>,
    ) -> Result<Option<ParkingSpot>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_spots SET
                status = $4,
                apartment_id = $2,
                vehicle = $3,
                assigned_at = NOW()
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(id)
            .bind(apartment_id)
            .bind(vehicle.map(Json))
            .bind(STATUS_ASSIGNED)
            .bind(STATUS_AVAILABLE)
            .fetch_optional(pool)
            .await
    }

    /// Return an assigned spot to the pool, clearing its assignment.
    ///
    /// Returns `None` if the spot is missing or not assigned.
    pub async fn release(pool: &PgPool, id: DbId) -> Result<Option<ParkingSpot>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_spots SET
                status = $2,
                apartment_id = NULL,
                vehicle = NULL,
                assigned_at = NULL
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(id)
            .bind(STATUS_AVAILABLE)
            .bind(STATUS_ASSIGNED)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM parking_spots WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
