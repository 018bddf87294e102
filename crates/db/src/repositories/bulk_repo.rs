//! Bulk deletes across whitelisted tables.

use conjunto_core::types::DbId;
use sqlx::PgPool;

/// Executes multi-row administrative operations.
pub struct BulkRepo;

impl BulkRepo {
    /// Delete every row of `table` whose id is in `ids`. Returns the number
    /// of rows removed.
    ///
    /// `table` must come from `conjunto_core::bulk::table_for_entity`; it is
    /// interpolated into the statement.
    pub async fn delete_many(
        pool: &PgPool,
        table: &'static str,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let query = format!("DELETE FROM {table} WHERE id = ANY($1)");
        let result = sqlx::query(&query).bind(ids).execute(pool).await?;
        tracing::debug!(table, deleted = result.rows_affected(), "Bulk delete");
        Ok(result.rows_affected())
    }
}
