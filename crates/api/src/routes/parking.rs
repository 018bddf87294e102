//! Route definitions for the `/parking` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::parking;
use crate::state::AppState;

/// Routes mounted at `/parking`.
///
/// ```text
/// GET    /               -> list_spots (?status, kind, apartment_id)
/// POST   /               -> create_spot
/// GET    /{id}           -> get_spot
/// PUT    /{id}           -> update_spot
/// DELETE /{id}           -> delete_spot
/// POST   /{id}/assign    -> assign_spot
/// POST   /{id}/release   -> release_spot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(parking::list_spots).post(parking::create_spot))
        .route(
            "/{id}",
            get(parking::get_spot)
                .put(parking::update_spot)
                .delete(parking::delete_spot),
        )
        .route("/{id}/assign", post(parking::assign_spot))
        .route("/{id}/release", post(parking::release_spot))
}
