//! Route definitions for the `/reservations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// GET    /              -> list_reservations (?area, date, status, user_id)
/// POST   /              -> create_reservation
/// GET    /quote         -> quote_reservation
/// GET    /{id}          -> get_reservation
/// DELETE /{id}          -> delete_reservation
/// POST   /{id}/status   -> transition_reservation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/quote", get(reservations::quote_reservation))
        .route(
            "/{id}",
            get(reservations::get_reservation).delete(reservations::delete_reservation),
        )
        .route("/{id}/status", post(reservations::transition_reservation))
}
