//! Route definitions for the `/admin` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every route requires the `admin` role.
///
/// ```text
/// POST /bulk-delete   -> bulk_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/bulk-delete", post(admin::bulk_delete))
}
