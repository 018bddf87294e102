//! Repository for the `user_statuses` lookup table.

use sqlx::PgPool;

use crate::models::status::UserStatusRow;

pub struct UserStatusRepo;

impl UserStatusRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<UserStatusRow>, sqlx::Error> {
        sqlx::query_as::<_, UserStatusRow>(
            "SELECT id, name, label, created_at, updated_at FROM user_statuses ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }
}
