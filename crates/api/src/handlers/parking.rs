//! Handlers for the `/parking` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use conjunto_core::parking::{
    can_assign, normalize_plate, validate_plate, STATUS_ASSIGNED, VALID_KINDS, VALID_STATUSES,
};
use conjunto_core::roles::{ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_PARKING};
use conjunto_core::types::DbId;
use conjunto_db::models::parking::{
    AssignParkingSpot, CreateParkingSpot, ParkingFilter, ParkingSpot, UpdateParkingSpot,
};
use conjunto_db::repositories::{ApartmentRepo, ParkingRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::check_one_of;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Spots only become `assigned` through the assign endpoint, which records
/// the apartment alongside.
fn check_manual_status(status: Option<&String>) -> AppResult<()> {
    if let Some(status) = status {
        check_one_of("status", status, VALID_STATUSES)?;
        if status == STATUS_ASSIGNED {
            return Err(AppError::invalid(
                "Use the assign endpoint to assign a parking spot",
            ));
        }
    }
    Ok(())
}

/// POST /api/v1/parking
pub async fn create_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateParkingSpot>,
) -> AppResult<(StatusCode, Json<DataResponse<ParkingSpot>>)> {
    auth.require(MODULE_PARKING, ACTION_CREATE)?;
    input.validate()?;
    check_one_of("kind", &input.kind, VALID_KINDS)?;
    check_manual_status(input.status.as_ref())?;

    let spot = ParkingRepo::create(&state.pool, &input).await?;
    tracing::info!(spot_id = spot.id, code = %spot.code, "Parking spot created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: spot })))
}

/// GET /api/v1/parking
pub async fn list_spots(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ParkingFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ParkingSpot>>>> {
    auth.require(MODULE_PARKING, ACTION_READ)?;
    let spots = ParkingRepo::list(&state.pool, &filter, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: spots }))
}

/// GET /api/v1/parking/{id}
pub async fn get_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ParkingSpot>>> {
    auth.require(MODULE_PARKING, ACTION_READ)?;
    let spot = ParkingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("ParkingSpot", id))?;
    Ok(Json(DataResponse { data: spot }))
}

/// PUT /api/v1/parking/{id}
pub async fn update_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateParkingSpot>,
) -> AppResult<Json<DataResponse<ParkingSpot>>> {
    auth.require(MODULE_PARKING, ACTION_UPDATE)?;
    input.validate()?;
    if let Some(kind) = &input.kind {
        check_one_of("kind", kind, VALID_KINDS)?;
    }
    check_manual_status(input.status.as_ref())?;

    let current = ParkingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("ParkingSpot", id))?;
    if current.status == STATUS_ASSIGNED && input.status.is_some() {
        return Err(AppError::conflict(
            "Release the parking spot before changing its status",
        ));
    }

    let spot = ParkingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("ParkingSpot", id))?;
    Ok(Json(DataResponse { data: spot }))
}

/// POST /api/v1/parking/{id}/assign
pub async fn assign_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<AssignParkingSpot>,
) -> AppResult<Json<DataResponse<ParkingSpot>>> {
    auth.require(MODULE_PARKING, ACTION_UPDATE)?;

    let spot = ParkingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("ParkingSpot", id))?;
    if !can_assign(&spot.status) {
        return Err(AppError::conflict(format!(
            "Parking spot {} is {}, not available",
            spot.code, spot.status
        )));
    }

    if let Some(vehicle) = input.vehicle.as_mut() {
        vehicle.plate = normalize_plate(&vehicle.plate);
        validate_plate(&spot.kind, &vehicle.plate).map_err(AppError::invalid)?;
    }

    if ApartmentRepo::find_by_id(&state.pool, input.apartment_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Apartment", input.apartment_id));
    }

    // The repository re-checks availability, so a concurrent assignment loses here.
    let spot = ParkingRepo::assign(&state.pool, id, input.apartment_id, input.vehicle.as_ref())
        .await?
        .ok_or_else(|| AppError::conflict("Parking spot was assigned concurrently"))?;

    tracing::info!(
        spot_id = id,
        apartment_id = input.apartment_id,
        "Parking spot assigned",
    );
    Ok(Json(DataResponse { data: spot }))
}

/// POST /api/v1/parking/{id}/release
pub async fn release_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ParkingSpot>>> {
    auth.require(MODULE_PARKING, ACTION_UPDATE)?;

    let spot = ParkingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("ParkingSpot", id))?;
    if spot.status != STATUS_ASSIGNED {
        return Err(AppError::conflict(format!(
            "Parking spot {} is not assigned",
            spot.code
        )));
    }

    let spot = ParkingRepo::release(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::conflict("Parking spot was released concurrently"))?;
    tracing::info!(spot_id = id, "Parking spot released");
    Ok(Json(DataResponse { data: spot }))
}

/// DELETE /api/v1/parking/{id}
pub async fn delete_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_PARKING, ACTION_DELETE)?;
    if ParkingRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("ParkingSpot", id))
    }
}
