//! Repository for the `notifications` table.
//!
//! A sent notification is copied into one row per recipient, so read state
//! is tracked per user.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NewNotification, Notification};
use crate::models::status::UserStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, message, kind, priority, channel, is_read, read_at, \
                       related_entity_type, related_entity_id, expires_at, created_at, updated_at";

/// Provides delivery and inbox operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Deliver `n` to a single user.
    pub async fn create_for_user(
        pool: &PgPool,
        user_id: DbId,
        n: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (user_id, title, message, kind, priority, channel,
                 related_entity_type, related_entity_id, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(&n.title)
            .bind(&n.message)
            .bind(&n.kind)
            .bind(&n.priority)
            .bind(&n.channel)
            .bind(&n.related_entity_type)
            .bind(n.related_entity_id)
            .bind(n.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Deliver `n` to every active user living in the tower. Returns the
    /// number of recipients.
    pub async fn create_for_tower(
        pool: &PgPool,
        tower_id: DbId,
        n: &NewNotification,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notifications
                (user_id, title, message, kind, priority, channel,
                 related_entity_type, related_entity_id, expires_at)
             SELECT u.id, $2, $3, $4, $5, $6, $7, $8, $9
             FROM users u
             JOIN apartments a ON a.id = u.apartment_id
             WHERE a.tower_id = $1 AND u.status_id = $10",
        )
        .bind(tower_id)
        .bind(&n.title)
        .bind(&n.message)
        .bind(&n.kind)
        .bind(&n.priority)
        .bind(&n.channel)
        .bind(&n.related_entity_type)
        .bind(n.related_entity_id)
        .bind(n.expires_at)
        .bind(UserStatus::Active.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Deliver `n` to every active user. Returns the number of recipients.
    pub async fn create_for_all(pool: &PgPool, n: &NewNotification) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notifications
                (user_id, title, message, kind, priority, channel,
                 related_entity_type, related_entity_id, expires_at)
             SELECT u.id, $1, $2, $3, $4, $5, $6, $7, $8
             FROM users u
             WHERE u.status_id = $9",
        )
        .bind(&n.title)
        .bind(&n.message)
        .bind(&n.kind)
        .bind(&n.priority)
        .bind(&n.channel)
        .bind(&n.related_entity_type)
        .bind(n.related_entity_id)
        .bind(n.expires_at)
        .bind(UserStatus::Active.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// A user's unexpired notifications, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1
               AND (NOT $2 OR NOT is_read)
               AND (expires_at IS NULL OR expires_at > NOW())
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications
             WHERE user_id = $1 AND NOT is_read
               AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark one of the user's notifications read. `read_at` keeps its first
    /// value on repeated calls.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET
                is_read = TRUE,
                read_at = COALESCE(read_at, NOW())
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark every unread, unexpired notification of the user read. Returns
    /// the count.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW()
             WHERE user_id = $1 AND NOT is_read
               AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
