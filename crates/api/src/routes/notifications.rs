//! Route definitions for the `/notifications` resource.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /               -> list_notifications (?unread_only, limit, offset)
/// POST   /               -> send_notification
/// GET    /unread-count   -> unread_count
/// PUT    /read-all       -> mark_all_read
/// DELETE /{id}           -> delete_notification
/// PUT    /{id}/read      -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::list_notifications).post(notifications::send_notification),
        )
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/{id}", delete(notifications::delete_notification))
        .route("/{id}/read", put(notifications::mark_read))
}
