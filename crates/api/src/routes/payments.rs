//! Route definitions for the `/payments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET    /                           -> list_payments (?apartment_id, status, period)
/// POST   /                           -> create_payment
/// GET    /statement/{apartment_id}   -> apartment_statement
/// GET    /{id}                       -> get_payment
/// DELETE /{id}                       -> delete_payment
/// POST   /{id}/pay                   -> pay_payment
/// POST   /{id}/overdue               -> mark_overdue
/// POST   /{id}/cancel                -> cancel_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::list_payments).post(payments::create_payment))
        .route(
            "/statement/{apartment_id}",
            get(payments::apartment_statement),
        )
        .route(
            "/{id}",
            get(payments::get_payment).delete(payments::delete_payment),
        )
        .route("/{id}/pay", post(payments::pay_payment))
        .route("/{id}/overdue", post(payments::mark_overdue))
        .route("/{id}/cancel", post(payments::cancel_payment))
}
