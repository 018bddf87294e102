//! Repository for the `reservations` table.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::reservation::BLOCKING_STATUSES;
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::reservation::{CreateReservation, Reservation, ReservationFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, area, user_id, apartment_id, date, start_time, end_time, \
                       duration_minutes, guests, cost, deposit, status, notes, \
                       cancellation_reason, tracking, created_at, updated_at";

/// Provides booking and lifecycle operations for reservations.
pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert a reservation unless its slot overlaps a pending or confirmed
    /// booking of the same area on the same date.
    ///
    /// The check and the insert run in one transaction holding an advisory
    /// lock on `(area, date)`, so concurrent requests for that slot are
    /// serialized. Returns `None` on overlap.
    pub async fn create_checked(
        pool: &PgPool,
        input: &CreateReservation,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || ':' || $2::TEXT))")
            .bind(&input.area)
            .bind(input.date)
            .execute(&mut *tx)
            .await?;

        let overlapping: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations
             WHERE area = $1 AND date = $2
               AND status = ANY($3)
               AND start_time < $5 AND $4 < end_time",
        )
        .bind(&input.area)
        .bind(input.date)
        .bind(BLOCKING_STATUSES)
        .bind(input.start_time)
        .bind(input.end_time)
        .fetch_one(&mut *tx)
        .await?;

        if overlapping > 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO reservations
                (area, user_id, apartment_id, date, start_time, end_time, duration_minutes,
                 guests, cost, deposit, notes, tracking)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&query)
            .bind(&input.area)
            .bind(input.user_id)
            .bind(input.apartment_id)
            .bind(input.date)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.duration_minutes)
            .bind(input.guests)
            .bind(input.cost)
            .bind(input.deposit)
            .bind(&input.notes)
            .bind(Json(&input.tracking))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(reservation))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reservations matching `filter`, by date and start time.
    pub async fn list(
        pool: &PgPool,
        filter: &ReservationFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE ($1::TEXT IS NULL OR area = $1)
               AND ($2::DATE IS NULL OR date = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4::BIGINT IS NULL OR user_id = $4)
             ORDER BY date, start_time, id
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(&filter.area)
            .bind(filter.date)
            .bind(&filter.status)
            .bind(filter.user_id)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Move a reservation from `from` to `to` and append `entry` to its
    /// tracking history. A `cancellation_reason` is stored when given.
    ///
    /// Returns `None` if the reservation is no longer in status `from`.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
        cancellation_reason: Option<&str>,
        entry: &TrackingEntry,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "UPDATE reservations SET
                status = $3,
                cancellation_reason = COALESCE($4, cancellation_reason),
                tracking = tracking || $5
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(cancellation_reason)
            .bind(Json([entry]))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
