//! Repository for the `pqrs_tickets` table.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::pqrs::Lifecycle;
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::pqrs::{CreatePqrsTicket, PqrsFilter, PqrsTicket, UpdatePqrsTicket};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ticket_number, kind, category, priority, status, subject, description, \
                       requester_id, apartment_id, assigned_to, response_due_at, resolution_due_at, \
                       first_response_at, resolved_at, closed_at, satisfaction_rating, tracking, \
                       created_at, updated_at";

/// Provides CRUD and lifecycle operations for PQRS tickets.
pub struct PqrsRepo;

impl PqrsRepo {
    /// Next value of the ticket-number sequence.
    pub async fn next_sequence(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT nextval('pqrs_ticket_seq')")
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreatePqrsTicket) -> Result<PqrsTicket, sqlx::Error> {
        let query = format!(
            "INSERT INTO pqrs_tickets
                (ticket_number, kind, category, priority, subject, description, requester_id,
                 apartment_id, response_due_at, resolution_due_at, tracking, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PqrsTicket>(&query)
            .bind(&input.ticket_number)
            .bind(&input.kind)
            .bind(&input.category)
            .bind(&input.priority)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(input.requester_id)
            .bind(input.apartment_id)
            .bind(input.response_due_at)
            .bind(input.resolution_due_at)
            .bind(Json(&input.tracking))
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PqrsTicket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pqrs_tickets WHERE id = $1");
        sqlx::query_as::<_, PqrsTicket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &PqrsFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<PqrsTicket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pqrs_tickets
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR priority = $2)
               AND ($3::TEXT IS NULL OR kind = $3)
               AND ($4::BIGINT IS NULL OR requester_id = $4)
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, PqrsTicket>(&query)
            .bind(&filter.status)
            .bind(&filter.priority)
            .bind(&filter.kind)
            .bind(filter.requester_id)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update editable fields. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` unless the ticket exists and is still `open` or
    /// `in_progress`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePqrsTicket,
    ) -> Result<Option<PqrsTicket>, sqlx::Error> {
        let query = format!(
            "UPDATE pqrs_tickets SET
                subject = COALESCE($2, subject),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                priority = COALESCE($5, priority),
                assigned_to = COALESCE($6, assigned_to),
                response_due_at = COALESCE($7, response_due_at),
                resolution_due_at = COALESCE($8, resolution_due_at)
             WHERE id = $1 AND status IN ('open', 'in_progress')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PqrsTicket>(&query)
            .bind(id)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.priority)
            .bind(input.assigned_to)
            .bind(input.response_due_at)
            .bind(input.resolution_due_at)
            .fetch_optional(pool)
            .await
    }

    /// Move a ticket from `from` to `to`, writing lifecycle timestamps and
    /// appending `entry` to its tracking history.
    ///
    /// Returns `None` if the ticket is no longer in status `from`.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
        lifecycle: &Lifecycle,
        entry: &TrackingEntry,
    ) -> Result<Option<PqrsTicket>, sqlx::Error> {
        let query = format!(
            "UPDATE pqrs_tickets SET
                status = $3,
                first_response_at = $4,
                resolved_at = $5,
                closed_at = $6,
                tracking = tracking || $7
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PqrsTicket>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(lifecycle.first_response_at)
            .bind(lifecycle.resolved_at)
            .bind(lifecycle.closed_at)
            .bind(Json([entry]))
            .fetch_optional(pool)
            .await
    }

    /// Store the requester's satisfaction rating.
    pub async fn rate(
        pool: &PgPool,
        id: DbId,
        rating: i16,
    ) -> Result<Option<PqrsTicket>, sqlx::Error> {
        let query = format!(
            "UPDATE pqrs_tickets SET satisfaction_rating = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PqrsTicket>(&query)
            .bind(id)
            .bind(rating)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pqrs_tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
