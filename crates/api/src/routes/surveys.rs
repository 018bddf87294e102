//! Route definitions for the `/surveys` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::surveys;
use crate::state::AppState;

/// Routes mounted at `/surveys`.
///
/// ```text
/// GET    /                 -> list_surveys (?status)
/// POST   /                 -> create_survey
/// GET    /{id}             -> get_survey
/// PUT    /{id}             -> update_survey
/// DELETE /{id}             -> delete_survey
/// POST   /{id}/publish     -> publish_survey
/// POST   /{id}/close       -> close_survey
/// POST   /{id}/responses   -> submit_response
/// GET    /{id}/results     -> survey_results
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(surveys::list_surveys).post(surveys::create_survey))
        .route(
            "/{id}",
            get(surveys::get_survey)
                .put(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route("/{id}/publish", post(surveys::publish_survey))
        .route("/{id}/close", post(surveys::close_survey))
        .route("/{id}/responses", post(surveys::submit_response))
        .route("/{id}/results", get(surveys::survey_results))
}
