//! Handlers for the `/reservations` resource (common-area bookings).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use conjunto_core::notification::KIND_RESERVATION;
use conjunto_core::reservation::{
    quote, state_machine, validate_reason, STATUS_CANCELLED, STATUS_PENDING, VALID_STATUSES,
};
use conjunto_core::roles::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_RESERVATIONS,
};
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::{Cop, DbId};
use conjunto_db::models::notification::NewNotification;
use conjunto_db::models::reservation::{CreateReservation, Reservation, ReservationFilter};
use conjunto_db::repositories::{ReservationRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::{check_one_of, notify};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /reservations`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub area: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub guests: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Query parameters for `GET /reservations/quote`.
#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    pub area: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub guests: i32,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub area: String,
    pub duration_minutes: i32,
    pub cost: Cop,
    pub deposit: Cop,
}

/// Request body for `POST /reservations/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct TransitionRequest {
    pub status: String,
    /// Required when cancelling.
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// GET /api/v1/reservations/quote
///
/// Price a booking without holding the slot.
pub async fn quote_reservation(
    auth: AuthUser,
    Query(params): Query<QuoteParams>,
) -> AppResult<Json<DataResponse<QuoteResponse>>> {
    auth.require(MODULE_RESERVATIONS, ACTION_READ)?;

    let today = Utc::now().date_naive();
    let q = quote(
        &params.area,
        params.date,
        params.start_time,
        params.end_time,
        params.guests,
        today,
    )
    .map_err(AppError::invalid)?;

    Ok(Json(DataResponse {
        data: QuoteResponse {
            area: params.area,
            duration_minutes: q.duration_minutes,
            cost: q.cost,
            deposit: q.deposit,
        },
    }))
}

/// POST /api/v1/reservations
///
/// Overlapping a pending or confirmed booking of the same area is a 409.
pub async fn create_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Reservation>>)> {
    auth.require(MODULE_RESERVATIONS, ACTION_CREATE)?;
    input.validate()?;

    let now = Utc::now();
    let q = quote(
        &input.area,
        input.date,
        input.start_time,
        input.end_time,
        input.guests,
        now.date_naive(),
    )
    .map_err(AppError::invalid)?;

    let apartment_id = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .and_then(|u| u.apartment_id);

    let create = CreateReservation {
        area: input.area,
        user_id: auth.user_id,
        apartment_id,
        date: input.date,
        start_time: input.start_time,
        end_time: input.end_time,
        duration_minutes: q.duration_minutes,
        guests: input.guests,
        cost: q.cost,
        deposit: q.deposit,
        notes: input.notes,
        tracking: vec![TrackingEntry::new(
            STATUS_PENDING,
            None,
            Some(auth.user_id),
            now,
        )],
    };

    let reservation = ReservationRepo::create_checked(&state.pool, &create)
        .await?
        .ok_or_else(|| {
            AppError::conflict(format!(
                "{} is already booked on {} between {} and {}",
                create.area, create.date, create.start_time, create.end_time
            ))
        })?;

    tracing::info!(
        reservation_id = reservation.id,
        area = %reservation.area,
        date = %reservation.date,
        "Reservation created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
}

/// GET /api/v1/reservations
///
/// Callers without `reservations:update` only list their own bookings.
pub async fn list_reservations(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(mut filter): Query<ReservationFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Reservation>>>> {
    auth.require(MODULE_RESERVATIONS, ACTION_READ)?;
    if !auth.can(MODULE_RESERVATIONS, ACTION_UPDATE) {
        filter.user_id = Some(auth.user_id);
    }

    let reservations = ReservationRepo::list(&state.pool, &filter, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: reservations }))
}

/// GET /api/v1/reservations/{id}
pub async fn get_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    auth.require(MODULE_RESERVATIONS, ACTION_READ)?;
    let reservation = ReservationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Reservation", id))?;
    if reservation.user_id != auth.user_id && !auth.can(MODULE_RESERVATIONS, ACTION_UPDATE) {
        return Err(AppError::not_found("Reservation", id));
    }
    Ok(Json(DataResponse { data: reservation }))
}

/// POST /api/v1/reservations/{id}/status
///
/// Owners may cancel their own bookings; any other move needs
/// `reservations:update`.
pub async fn transition_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    input.validate()?;
    check_one_of("status", &input.status, VALID_STATUSES)?;

    let reservation = ReservationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Reservation", id))?;

    let is_owner = reservation.user_id == auth.user_id;
    if !auth.can(MODULE_RESERVATIONS, ACTION_UPDATE) {
        if !is_owner {
            return Err(AppError::not_found("Reservation", id));
        }
        if input.status != STATUS_CANCELLED {
            return Err(AppError::forbidden(
                "You can only cancel your own reservations",
            ));
        }
    }

    state_machine::validate_transition(&reservation.status, &input.status)
        .map_err(AppError::conflict)?;
    validate_reason(&input.status, input.reason.as_deref()).map_err(AppError::invalid)?;

    let now = Utc::now();
    let entry = TrackingEntry::new(&input.status, input.reason.clone(), Some(auth.user_id), now);
    let cancellation_reason = if input.status == STATUS_CANCELLED {
        input.reason.as_deref()
    } else {
        None
    };

    let updated = ReservationRepo::transition(
        &state.pool,
        id,
        &reservation.status,
        &input.status,
        cancellation_reason,
        &entry,
    )
    .await?
    .ok_or_else(|| AppError::conflict("Reservation status changed concurrently, retry"))?;

    tracing::info!(
        reservation_id = id,
        from = %reservation.status,
        to = %updated.status,
        actor = auth.user_id,
        "Reservation status changed",
    );

    if !is_owner {
        notify(
            &state.pool,
            updated.user_id,
            NewNotification::about(
                KIND_RESERVATION,
                "Reservation updated",
                format!(
                    "Your {} reservation on {} is now {}",
                    updated.area, updated.date, updated.status
                ),
                "reservation",
                updated.id,
            ),
        )
        .await;
    }

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/reservations/{id}
pub async fn delete_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_RESERVATIONS, ACTION_DELETE)?;
    if ReservationRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Reservation", id))
    }
}
