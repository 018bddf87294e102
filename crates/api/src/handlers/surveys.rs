//! Handlers for the `/surveys` resource and its responses.
//!
//! Drafts are visible only to callers holding `surveys:update`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use conjunto_core::roles::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_SURVEYS,
};
use conjunto_core::survey::{
    accepts_responses, state_machine, tally, validate_answers, validate_publish,
    validate_questions, validate_window, Answers, SurveyResults, STATUS_ACTIVE, STATUS_CLOSED,
    STATUS_DRAFT,
};
use conjunto_core::types::{DbId, Timestamp};
use conjunto_db::models::survey::{CreateSurvey, Survey, SurveyFilter, UpdateSurvey};
use conjunto_db::repositories::SurveyRepo;
use conjunto_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A survey with the caller's participation.
#[derive(Debug, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub response_count: i64,
    pub has_responded: bool,
}

/// Request body for `POST /surveys/{id}/responses`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub answers: Answers,
}

#[derive(Debug, Serialize)]
pub struct SubmittedResponse {
    pub id: DbId,
    pub survey_id: DbId,
    pub created_at: Timestamp,
}

fn is_staff(auth: &AuthUser) -> bool {
    auth.can(MODULE_SURVEYS, ACTION_UPDATE)
}

async fn load_visible(pool: &DbPool, auth: &AuthUser, id: DbId) -> AppResult<Survey> {
    let survey = SurveyRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Survey", id))?;
    if survey.status == STATUS_DRAFT && !is_staff(auth) {
        return Err(AppError::not_found("Survey", id));
    }
    Ok(survey)
}

async fn change_status(pool: &DbPool, survey: &Survey, to: &str) -> AppResult<Survey> {
    state_machine::validate_transition(&survey.status, to).map_err(AppError::conflict)?;
    SurveyRepo::set_status(pool, survey.id, &survey.status, to)
        .await?
        .ok_or_else(|| AppError::conflict("Survey status changed concurrently, retry"))
}

/// POST /api/v1/surveys
pub async fn create_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSurvey>,
) -> AppResult<(StatusCode, Json<DataResponse<Survey>>)> {
    auth.require(MODULE_SURVEYS, ACTION_CREATE)?;
    input.validate()?;
    validate_window(input.starts_at, input.ends_at).map_err(AppError::invalid)?;
    validate_questions(&input.questions).map_err(AppError::invalid)?;

    let survey = SurveyRepo::create(&state.pool, &input, auth.user_id).await?;
    tracing::info!(survey_id = survey.id, title = %survey.title, "Survey created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: survey })))
}

/// GET /api/v1/surveys
pub async fn list_surveys(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<SurveyFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Survey>>>> {
    auth.require(MODULE_SURVEYS, ACTION_READ)?;
    let surveys = SurveyRepo::list(
        &state.pool,
        &filter,
        !is_staff(&auth),
        page.limit,
        page.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: surveys }))
}

/// GET /api/v1/surveys/{id}
pub async fn get_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SurveyDetail>>> {
    auth.require(MODULE_SURVEYS, ACTION_READ)?;
    let survey = load_visible(&state.pool, &auth, id).await?;
    let response_count = SurveyRepo::response_count(&state.pool, id).await?;
    let has_responded = SurveyRepo::has_responded(&state.pool, id, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: SurveyDetail {
            survey,
            response_count,
            has_responded,
        },
    }))
}

/// PUT /api/v1/surveys/{id}
///
/// Only drafts can be edited.
pub async fn update_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSurvey>,
) -> AppResult<Json<DataResponse<Survey>>> {
    auth.require(MODULE_SURVEYS, ACTION_UPDATE)?;
    input.validate()?;
    if let Some(questions) = &input.questions {
        validate_questions(questions).map_err(AppError::invalid)?;
    }

    let current = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Survey", id))?;
    if current.status != STATUS_DRAFT {
        return Err(AppError::conflict(format!(
            "Survey is {}; only drafts can be edited",
            current.status
        )));
    }
    validate_window(
        input.starts_at.unwrap_or(current.starts_at),
        input.ends_at.unwrap_or(current.ends_at),
    )
    .map_err(AppError::invalid)?;

    let survey = SurveyRepo::update_draft(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::conflict("Survey was published concurrently"))?;
    Ok(Json(DataResponse { data: survey }))
}

/// POST /api/v1/surveys/{id}/publish
pub async fn publish_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Survey>>> {
    auth.require(MODULE_SURVEYS, ACTION_UPDATE)?;
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Survey", id))?;
    validate_publish(&survey.questions).map_err(AppError::invalid)?;

    let survey = change_status(&state.pool, &survey, STATUS_ACTIVE).await?;
    tracing::info!(survey_id = id, "Survey published");
    Ok(Json(DataResponse { data: survey }))
}

/// POST /api/v1/surveys/{id}/close
pub async fn close_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Survey>>> {
    auth.require(MODULE_SURVEYS, ACTION_UPDATE)?;
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Survey", id))?;

    let survey = change_status(&state.pool, &survey, STATUS_CLOSED).await?;
    tracing::info!(survey_id = id, "Survey closed");
    Ok(Json(DataResponse { data: survey }))
}

/// DELETE /api/v1/surveys/{id}
pub async fn delete_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_SURVEYS, ACTION_DELETE)?;
    if SurveyRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Survey", id))
    }
}

/// POST /api/v1/surveys/{id}/responses
///
/// One response per user; a second submission is a 409.
pub async fn submit_response(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitResponseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmittedResponse>>)> {
    auth.require(MODULE_SURVEYS, ACTION_READ)?;
    let survey = load_visible(&state.pool, &auth, id).await?;

    accepts_responses(&survey.status, survey.starts_at, survey.ends_at, Utc::now())
        .map_err(AppError::conflict)?;
    validate_answers(&survey.questions, &input.answers).map_err(AppError::invalid)?;

    let response = SurveyRepo::add_response(&state.pool, id, auth.user_id, &input.answers).await?;
    tracing::info!(survey_id = id, response_id = response.id, "Survey response recorded");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedResponse {
                id: response.id,
                survey_id: response.survey_id,
                created_at: response.created_at,
            },
        }),
    ))
}

/// GET /api/v1/surveys/{id}/results
///
/// Staff see results at any time; everyone else once the survey is closed.
pub async fn survey_results(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SurveyResults>>> {
    auth.require(MODULE_SURVEYS, ACTION_READ)?;
    let survey = load_visible(&state.pool, &auth, id).await?;
    if survey.status != STATUS_CLOSED && !is_staff(&auth) {
        return Err(AppError::forbidden(
            "Results are published when the survey closes",
        ));
    }

    let answers = SurveyRepo::list_answers(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: tally(&survey.questions, &answers),
    }))
}
