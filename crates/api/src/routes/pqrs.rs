//! Route definitions for the `/pqrs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pqrs;
use crate::state::AppState;

/// Routes mounted at `/pqrs`.
///
/// ```text
/// GET    /              -> list_tickets (?status, priority, kind, requester_id)
/// POST   /              -> create_ticket
/// GET    /{id}          -> get_ticket
/// PUT    /{id}          -> update_ticket
/// DELETE /{id}          -> delete_ticket
/// POST   /{id}/status   -> transition_ticket
/// POST   /{id}/rating   -> rate_ticket
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pqrs::list_tickets).post(pqrs::create_ticket))
        .route(
            "/{id}",
            get(pqrs::get_ticket)
                .put(pqrs::update_ticket)
                .delete(pqrs::delete_ticket),
        )
        .route("/{id}/status", post(pqrs::transition_ticket))
        .route("/{id}/rating", post(pqrs::rate_ticket))
}
