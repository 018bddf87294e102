//! Route definitions for roles, modules, permissions and user statuses.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// GET    /roles                    -> list_roles
/// POST   /roles                    -> create_role
/// GET    /roles/{id}               -> get_role
/// DELETE /roles/{id}               -> delete_role
/// PUT    /roles/{id}/permissions   -> set_role_permissions
/// GET    /modules                  -> list_modules
/// GET    /permissions              -> list_permissions
/// GET    /user-statuses            -> list_user_statuses
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route("/roles/{id}", get(roles::get_role).delete(roles::delete_role))
        .route("/roles/{id}/permissions", put(roles::set_role_permissions))
        .route("/modules", get(roles::list_modules))
        .route("/permissions", get(roles::list_permissions))
        .route("/user-statuses", get(roles::list_user_statuses))
}
