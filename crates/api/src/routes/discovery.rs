//! `GET /api`: lists the mounted endpoints.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::routes::ENDPOINTS;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiListing {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

async fn list_endpoints() -> Json<ApiListing> {
    Json(ApiListing {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

/// Mount the listing at the root, next to `/health`.
pub fn router() -> Router<AppState> {
    Router::new().route("/api", get(list_endpoints))
}
