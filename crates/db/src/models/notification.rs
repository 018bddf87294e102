//! Notification model and DTOs.

use conjunto_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub priority: String,
    pub channel: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Notification content, copied to every recipient on send.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub priority: String,
    pub channel: String,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub expires_at: Option<Timestamp>,
}

impl NewNotification {
    /// An in-app message about a related record, e.g. a PQRS status change.
    pub fn about(
        kind: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        entity_type: &str,
        entity_id: DbId,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: kind.to_string(),
            priority: conjunto_core::notification::PRIORITY_NORMAL.to_string(),
            channel: conjunto_core::notification::CHANNEL_IN_APP.to_string(),
            related_entity_type: Some(entity_type.to_string()),
            related_entity_id: Some(entity_id),
            expires_at: None,
        }
    }
}

/// Query parameters for the own-notification list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}
