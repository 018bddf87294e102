pub mod admin;
pub mod auth;
pub mod discovery;
pub mod health;
pub mod notifications;
pub mod parking;
pub mod payments;
pub mod pqrs;
pub mod reservations;
pub mod roles;
pub mod surveys;
pub mod towers;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                     login (public)
/// /auth/me                                        current user
/// /auth/password                                  change own password
///
/// /roles                                          list, create
/// /roles/{id}                                     get, delete
/// /roles/{id}/permissions                         replace permission set (PUT)
/// /modules                                        list
/// /permissions                                    list
/// /user-statuses                                  list
///
/// /users                                          list, create
/// /users/{id}                                     get, update, delete
/// /users/{id}/status                              change status (PUT)
/// /users/{id}/pets                                replace pets (PUT)
///
/// /towers                                         list, create
/// /towers/{id}                                    get, update, delete
/// /towers/{tower_id}/apartments                   list, create
/// /towers/{tower_id}/apartments/{id}              get, update, delete
///
/// /parking                                        list, create
/// /parking/{id}                                   get, update, delete
/// /parking/{id}/assign                            assign (POST)
/// /parking/{id}/release                           release (POST)
///
/// /pqrs                                           list, create
/// /pqrs/{id}                                      get, update, delete
/// /pqrs/{id}/status                               transition (POST)
/// /pqrs/{id}/rating                               rate (POST)
///
/// /reservations                                   list, create
/// /reservations/quote                             price a booking (GET)
/// /reservations/{id}                              get, delete
/// /reservations/{id}/status                       transition (POST)
///
/// /notifications                                  list own, send
/// /notifications/unread-count                     unread count (GET)
/// /notifications/read-all                         mark all read (PUT)
/// /notifications/{id}                             delete
/// /notifications/{id}/read                        mark read (PUT)
///
/// /surveys                                        list, create
/// /surveys/{id}                                   get, update, delete
/// /surveys/{id}/publish                           publish (POST)
/// /surveys/{id}/close                             close (POST)
/// /surveys/{id}/responses                         submit (POST)
/// /surveys/{id}/results                           results (GET)
///
/// /payments                                       list, create
/// /payments/statement/{apartment_id}              apartment statement (GET)
/// /payments/{id}                                  get, delete
/// /payments/{id}/pay                              settle (POST)
/// /payments/{id}/overdue                          mark overdue (POST)
/// /payments/{id}/cancel                           cancel (POST)
///
/// /admin/bulk-delete                              bulk delete (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(roles::router())
        .nest("/users", users::router())
        .nest("/towers", towers::router())
        .nest("/parking", parking::router())
        .nest("/pqrs", pqrs::router())
        .nest("/reservations", reservations::router())
        .nest("/notifications", notifications::router())
        .nest("/surveys", surveys::router())
        .nest("/payments", payments::router())
        .nest("/admin", admin::router())
}

/// Every mounted endpoint, as listed by `GET /api`.
pub const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET /api",
    "POST /api/v1/auth/login",
    "GET /api/v1/auth/me",
    "POST /api/v1/auth/password",
    "GET /api/v1/roles",
    "POST /api/v1/roles",
    "GET /api/v1/roles/{id}",
    "DELETE /api/v1/roles/{id}",
    "PUT /api/v1/roles/{id}/permissions",
    "GET /api/v1/modules",
    "GET /api/v1/permissions",
    "GET /api/v1/user-statuses",
    "GET /api/v1/users",
    "POST /api/v1/users",
    "GET /api/v1/users/{id}",
    "PUT /api/v1/users/{id}",
    "DELETE /api/v1/users/{id}",
    "PUT /api/v1/users/{id}/status",
    "PUT /api/v1/users/{id}/pets",
    "GET /api/v1/towers",
    "POST /api/v1/towers",
    "GET /api/v1/towers/{id}",
    "PUT /api/v1/towers/{id}",
    "DELETE /api/v1/towers/{id}",
    "GET /api/v1/towers/{tower_id}/apartments",
    "POST /api/v1/towers/{tower_id}/apartments",
    "GET /api/v1/towers/{tower_id}/apartments/{id}",
    "PUT /api/v1/towers/{tower_id}/apartments/{id}",
    "DELETE /api/v1/towers/{tower_id}/apartments/{id}",
    "GET /api/v1/parking",
    "POST /api/v1/parking",
    "GET /api/v1/parking/{id}",
    "PUT /api/v1/parking/{id}",
    "DELETE /api/v1/parking/{id}",
    "POST /api/v1/parking/{id}/assign",
    "POST /api/v1/parking/{id}/release",
    "GET /api/v1/pqrs",
    "POST /api/v1/pqrs",
    "GET /api/v1/pqrs/{id}",
    "PUT /api/v1/pqrs/{id}",
    "DELETE /api/v1/pqrs/{id}",
    "POST /api/v1/pqrs/{id}/status",
    "POST /api/v1/pqrs/{id}/rating",
    "GET /api/v1/reservations",
    "POST /api/v1/reservations",
    "GET /api/v1/reservations/quote",
    "GET /api/v1/reservations/{id}",
    "DELETE /api/v1/reservations/{id}",
    "POST /api/v1/reservations/{id}/status",
    "GET /api/v1/notifications",
    "POST /api/v1/notifications",
    "GET /api/v1/notifications/unread-count",
    "PUT /api/v1/notifications/read-all",
    "DELETE /api/v1/notifications/{id}",
    "PUT /api/v1/notifications/{id}/read",
    "GET /api/v1/surveys",
    "POST /api/v1/surveys",
    "GET /api/v1/surveys/{id}",
    "PUT /api/v1/surveys/{id}",
    "DELETE /api/v1/surveys/{id}",
    "POST /api/v1/surveys/{id}/publish",
    "POST /api/v1/surveys/{id}/close",
    "POST /api/v1/surveys/{id}/responses",
    "GET /api/v1/surveys/{id}/results",
    "GET /api/v1/payments",
    "POST /api/v1/payments",
    "GET /api/v1/payments/statement/{apartment_id}",
    "GET /api/v1/payments/{id}",
    "DELETE /api/v1/payments/{id}",
    "POST /api/v1/payments/{id}/pay",
    "POST /api/v1/payments/{id}/overdue",
    "POST /api/v1/payments/{id}/cancel",
    "POST /api/v1/admin/bulk-delete",
];
