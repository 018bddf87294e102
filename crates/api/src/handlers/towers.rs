//! Handlers for the `/towers` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use conjunto_core::roles::{ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_TOWERS};
use conjunto_core::types::DbId;
use conjunto_db::models::property::{CreateTower, Tower, UpdateTower};
use conjunto_db::repositories::TowerRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/towers
pub async fn create_tower(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTower>,
) -> AppResult<(StatusCode, Json<DataResponse<Tower>>)> {
    auth.require(MODULE_TOWERS, ACTION_CREATE)?;
    input.validate()?;

    let tower = TowerRepo::create(&state.pool, &input).await?;
    tracing::info!(tower_id = tower.id, name = %tower.name, "Tower created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: tower })))
}

/// GET /api/v1/towers
pub async fn list_towers(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Tower>>>> {
    auth.require(MODULE_TOWERS, ACTION_READ)?;
    let towers = TowerRepo::list(&state.pool, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: towers }))
}

/// GET /api/v1/towers/{id}
pub async fn get_tower(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Tower>>> {
    auth.require(MODULE_TOWERS, ACTION_READ)?;
    let tower = TowerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Tower", id))?;
    Ok(Json(DataResponse { data: tower }))
}

/// PUT /api/v1/towers/{id}
///
/// A tower cannot shrink below the highest floor that holds an apartment.
pub async fn update_tower(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTower>,
) -> AppResult<Json<DataResponse<Tower>>> {
    auth.require(MODULE_TOWERS, ACTION_UPDATE)?;
    input.validate()?;

    if let Some(floors) = input.floors {
        if let Some(highest) = TowerRepo::highest_used_floor(&state.pool, id).await? {
            if floors < highest {
                return Err(AppError::conflict(format!(
                    "Tower has apartments up to floor {highest}; cannot reduce floors to {floors}"
                )));
            }
        }
    }

    let tower = TowerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Tower", id))?;
    Ok(Json(DataResponse { data: tower }))
}

/// DELETE /api/v1/towers/{id}
///
/// Deleting a tower removes its apartments.
pub async fn delete_tower(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_TOWERS, ACTION_DELETE)?;
    let deleted = TowerRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(tower_id = id, deleted_by = auth.user_id, "Tower deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Tower", id))
    }
}
