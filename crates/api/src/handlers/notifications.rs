//! Handlers for the `/notifications` resource.
//!
//! Sending fans out one row per recipient. Everything else works on the
//! caller's own inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use conjunto_core::notification::{
    resolve_audience, Audience, CHANNEL_IN_APP, PRIORITY_NORMAL, VALID_CHANNELS, VALID_KINDS,
    VALID_PRIORITIES,
};
use conjunto_core::roles::{ACTION_CREATE, ACTION_READ, ACTION_UPDATE, MODULE_NOTIFICATIONS};
use conjunto_core::types::{DbId, Timestamp};
use conjunto_db::models::notification::{NewNotification, Notification, NotificationFilter};
use conjunto_db::repositories::{NotificationRepo, TowerRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::check_one_of;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

/// Request body for `POST /notifications`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendNotificationRequest {
    /// `user`, `tower` or `all`.
    pub target: String,
    pub user_id: Option<DbId>,
    pub tower_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    pub kind: String,
    pub priority: Option<String>,
    pub channel: Option<String>,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub expires_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub recipients: u64,
}

/// POST /api/v1/notifications
pub async fn send_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendNotificationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SendResponse>>)> {
    auth.require(MODULE_NOTIFICATIONS, ACTION_CREATE)?;
    input.validate()?;

    let audience =
        resolve_audience(&input.target, input.user_id, input.tower_id).map_err(AppError::invalid)?;
    check_one_of("kind", &input.kind, VALID_KINDS)?;
    let priority = input.priority.unwrap_or_else(|| PRIORITY_NORMAL.to_string());
    check_one_of("priority", &priority, VALID_PRIORITIES)?;
    let channel = input.channel.unwrap_or_else(|| CHANNEL_IN_APP.to_string());
    check_one_of("channel", &channel, VALID_CHANNELS)?;

    let notification = NewNotification {
        title: input.title,
        message: input.message,
        kind: input.kind,
        priority,
        channel,
        related_entity_type: input.related_entity_type,
        related_entity_id: input.related_entity_id,
        expires_at: input.expires_at,
    };

    let recipients = match audience {
        Audience::User(user_id) => {
            if UserRepo::find_by_id(&state.pool, user_id).await?.is_none() {
                return Err(AppError::not_found("User", user_id));
            }
            NotificationRepo::create_for_user(&state.pool, user_id, &notification).await?;
            1
        }
        Audience::Tower(tower_id) => {
            if TowerRepo::find_by_id(&state.pool, tower_id).await?.is_none() {
                return Err(AppError::not_found("Tower", tower_id));
            }
            NotificationRepo::create_for_tower(&state.pool, tower_id, &notification).await?
        }
        Audience::All => NotificationRepo::create_for_all(&state.pool, &notification).await?,
    };

    tracing::info!(
        audience = %input.target,
        recipients,
        sender = auth.user_id,
        "Notification sent",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SendResponse { recipients },
        }),
    ))
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    auth.require(MODULE_NOTIFICATIONS, ACTION_READ)?;
    let items = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        filter.unread_only,
        page.limit,
        page.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    auth.require(MODULE_NOTIFICATIONS, ACTION_READ)?;
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: CountResponse {
            count: u64::try_from(count).unwrap_or_default(),
        },
    }))
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    auth.require(MODULE_NOTIFICATIONS, ACTION_UPDATE)?;
    let notification = NotificationRepo::mark_read(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("Notification", id))?;
    Ok(Json(DataResponse { data: notification }))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    auth.require(MODULE_NOTIFICATIONS, ACTION_UPDATE)?;
    let count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// DELETE /api/v1/notifications/{id}
///
/// Removes a notification from the caller's own inbox.
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_NOTIFICATIONS, ACTION_UPDATE)?;
    if NotificationRepo::delete(&state.pool, id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Notification", id))
    }
}
