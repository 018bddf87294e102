//! Repository for the `payments` table.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::payment::{
    OUTSTANDING_STATUSES, STATUS_CANCELLED, STATUS_OVERDUE, STATUS_PAID, STATUS_PENDING,
};
use conjunto_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::payment::{
    AccountStatement, CreatePayment, Payment, PaymentFilter, SettlePayment,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, receipt_number, apartment_id, user_id, concept, period, items, \
                       subtotal, discount, late_fee, total, method, status, due_date, paid_at, \
                       reference, created_at, updated_at";

/// Provides CRUD and settlement operations for payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Next value of the receipt-number sequence.
    pub async fn next_sequence(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT nextval('payment_receipt_seq')")
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments
                (receipt_number, apartment_id, user_id, concept, period, items,
                 subtotal, discount, late_fee, total, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(&input.receipt_number)
            .bind(input.apartment_id)
            .bind(input.user_id)
            .bind(&input.concept)
            .bind(&input.period)
            .bind(Json(&input.items))
            .bind(input.subtotal)
            .bind(input.discount)
            .bind(input.late_fee)
            .bind(input.total)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List payments matching `filter`, latest due date first.
    pub async fn list(
        pool: &PgPool,
        filter: &PaymentFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments
             WHERE ($1::BIGINT IS NULL OR apartment_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::TEXT IS NULL OR period = $3)
             ORDER BY due_date DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(filter.apartment_id)
            .bind(&filter.status)
            .bind(&filter.period)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Mark a payment paid, storing the final late fee and total.
    ///
    /// Returns `None` if the payment is no longer in status `from`.
    pub async fn settle(
        pool: &PgPool,
        id: DbId,
        from: &str,
        input: &SettlePayment,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET
                status = $3,
                method = $4,
                reference = $5,
                late_fee = $6,
                total = $7,
                paid_at = $8
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(from)
            .bind(STATUS_PAID)
            .bind(&input.method)
            .bind(&input.reference)
            .bind(input.late_fee)
            .bind(input.total)
            .bind(input.paid_at)
            .fetch_optional(pool)
            .await
    }

    /// Flag a pending payment overdue with its accrued late fee.
    pub async fn mark_overdue(
        pool: &PgPool,
        id: DbId,
        late_fee: i64,
        total: i64,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status = $2, late_fee = $3, total = $4
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(STATUS_OVERDUE)
            .bind(late_fee)
            .bind(total)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Cancel a payment that is still in status `from`.
    pub async fn cancel(pool: &PgPool, id: DbId, from: &str) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status = $3 WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(from)
            .bind(STATUS_CANCELLED)
            .fetch_optional(pool)
            .await
    }

    /// Outstanding and paid balances of an apartment.
    pub async fn statement(
        pool: &PgPool,
        apartment_id: DbId,
    ) -> Result<AccountStatement, sqlx::Error> {
        sqlx::query_as::<_, AccountStatement>(
            "SELECT
                $1::BIGINT AS apartment_id,
                COUNT(*) FILTER (WHERE status = ANY($2)) AS outstanding_count,
                COALESCE(SUM(total) FILTER (WHERE status = ANY($2)), 0)::BIGINT
                    AS outstanding_total,
                COUNT(*) FILTER (WHERE status = $3) AS overdue_count,
                COALESCE(SUM(total) FILTER (WHERE status = $4), 0)::BIGINT AS paid_total
             FROM payments
             WHERE apartment_id = $1",
        )
        .bind(apartment_id)
        .bind(OUTSTANDING_STATUSES)
        .bind(STATUS_OVERDUE)
        .bind(STATUS_PAID)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
