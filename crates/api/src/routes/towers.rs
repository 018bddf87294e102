//! Route definitions for the `/towers` resource.
//!
//! Also nests apartment routes under `/towers/{tower_id}/apartments`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{apartments, towers};
use crate::state::AppState;

/// Routes mounted at `/towers`.
///
/// ```text
/// GET    /                                -> list_towers
/// POST   /                                -> create_tower
/// GET    /{id}                            -> get_tower
/// PUT    /{id}                            -> update_tower
/// DELETE /{id}                            -> delete_tower
///
/// GET    /{tower_id}/apartments           -> list_apartments
/// POST   /{tower_id}/apartments           -> create_apartment
/// GET    /{tower_id}/apartments/{id}      -> get_apartment
/// PUT    /{tower_id}/apartments/{id}      -> update_apartment
/// DELETE /{tower_id}/apartments/{id}      -> delete_apartment
/// ```
pub fn router() -> Router<AppState> {
    let apartment_routes = Router::new()
        .route(
            "/",
            get(apartments::list_apartments).post(apartments::create_apartment),
        )
        .route(
            "/{id}",
            get(apartments::get_apartment)
                .put(apartments::update_apartment)
                .delete(apartments::delete_apartment),
        );

    Router::new()
        .route("/", get(towers::list_towers).post(towers::create_tower))
        .route(
            "/{id}",
            get(towers::get_tower)
                .put(towers::update_tower)
                .delete(towers::delete_tower),
        )
        .nest("/{tower_id}/apartments", apartment_routes)
}
