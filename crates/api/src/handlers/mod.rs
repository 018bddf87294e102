//! HTTP handlers, one module per resource.

pub mod admin;
pub mod apartments;
pub mod auth;
pub mod notifications;
pub mod parking;
pub mod payments;
pub mod pqrs;
pub mod reservations;
pub mod roles;
pub mod surveys;
pub mod towers;
pub mod users;

use conjunto_core::types::DbId;
use conjunto_core::validation::validate_one_of;
use conjunto_db::models::notification::NewNotification;
use conjunto_db::repositories::NotificationRepo;
use conjunto_db::DbPool;

use crate::error::{AppError, AppResult};

/// Validate an enumerated field, mapping failures to 400.
pub(crate) fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> AppResult<()> {
    validate_one_of(field, value, allowed).map_err(AppError::invalid)
}

/// Deliver an in-app notification as a side effect of another change.
///
/// The change that triggered it is already committed, so a delivery failure
/// is logged rather than returned.
pub(crate) async fn notify(pool: &DbPool, user_id: DbId, notification: NewNotification) {
    if let Err(e) = NotificationRepo::create_for_user(pool, user_id, &notification).await {
        tracing::warn!(error = %e, user_id, "Failed to deliver notification");
    }
}
