//! Handlers for apartments, nested under `/towers/{tower_id}/apartments`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use conjunto_core::property::{validate_area, validate_floor, VALID_OCCUPANCIES};
use conjunto_core::roles::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_APARTMENTS,
};
use conjunto_core::types::DbId;
use conjunto_db::models::property::{Apartment, CreateApartment, Tower, UpdateApartment};
use conjunto_db::repositories::{ApartmentRepo, TowerRepo};
use conjunto_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::check_one_of;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn load_tower(pool: &DbPool, tower_id: DbId) -> AppResult<Tower> {
    TowerRepo::find_by_id(pool, tower_id)
        .await?
        .ok_or(AppError::not_found("Tower", tower_id))
}

/// POST /api/v1/towers/{tower_id}/apartments
pub async fn create_apartment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(tower_id): Path<DbId>,
    Json(input): Json<CreateApartment>,
) -> AppResult<(StatusCode, Json<DataResponse<Apartment>>)> {
    auth.require(MODULE_APARTMENTS, ACTION_CREATE)?;
    input.validate()?;
    validate_area(input.area_m2).map_err(AppError::invalid)?;
    if let Some(occupancy) = &input.occupancy {
        check_one_of("occupancy", occupancy, VALID_OCCUPANCIES)?;
    }

    let tower = load_tower(&state.pool, tower_id).await?;
    validate_floor(input.floor, tower.floors).map_err(AppError::invalid)?;

    let apartment = ApartmentRepo::create(&state.pool, tower_id, &input).await?;
    tracing::info!(
        apartment_id = apartment.id,
        tower_id,
        number = %apartment.number,
        "Apartment created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: apartment })))
}

/// GET /api/v1/towers/{tower_id}/apartments
pub async fn list_apartments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(tower_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Apartment>>>> {
    auth.require(MODULE_APARTMENTS, ACTION_READ)?;
    load_tower(&state.pool, tower_id).await?;

    let apartments =
        ApartmentRepo::list_by_tower(&state.pool, tower_id, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: apartments }))
}

/// GET /api/v1/towers/{tower_id}/apartments/{id}
pub async fn get_apartment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((tower_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Apartment>>> {
    auth.require(MODULE_APARTMENTS, ACTION_READ)?;
    let apartment = ApartmentRepo::find_in_tower(&state.pool, tower_id, id)
        .await?
        .ok_or(AppError::not_found("Apartment", id))?;
    Ok(Json(DataResponse { data: apartment }))
}

/// PUT /api/v1/towers/{tower_id}/apartments/{id}
pub async fn update_apartment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((tower_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateApartment>,
) -> AppResult<Json<DataResponse<Apartment>>> {
    auth.require(MODULE_APARTMENTS, ACTION_UPDATE)?;
    input.validate()?;
    if let Some(area) = input.area_m2 {
        validate_area(area).map_err(AppError::invalid)?;
    }
    if let Some(occupancy) = &input.occupancy {
        check_one_of("occupancy", occupancy, VALID_OCCUPANCIES)?;
    }
    if let Some(floor) = input.floor {
        let tower = load_tower(&state.pool, tower_id).await?;
        validate_floor(floor, tower.floors).map_err(AppError::invalid)?;
    }

    let apartment = ApartmentRepo::update(&state.pool, tower_id, id, &input)
        .await?
        .ok_or(AppError::not_found("Apartment", id))?;
    Ok(Json(DataResponse { data: apartment }))
}

/// DELETE /api/v1/towers/{tower_id}/apartments/{id}
pub async fn delete_apartment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((tower_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_APARTMENTS, ACTION_DELETE)?;
    let deleted = ApartmentRepo::delete(&state.pool, tower_id, id).await?;
    if deleted {
        tracing::info!(apartment_id = id, tower_id, "Apartment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Apartment", id))
    }
}
