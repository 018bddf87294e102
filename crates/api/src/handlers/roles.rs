//! Handlers for roles, permissions, modules and user statuses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use conjunto_core::roles::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_ROLES, MODULE_USERS,
};
use conjunto_core::types::DbId;
use conjunto_db::models::role::{
    CreateRole, Module, Permission, RoleWithPermissions, SetRolePermissions,
};
use conjunto_db::models::status::UserStatusRow;
use conjunto_db::repositories::{ModuleRepo, PermissionRepo, RoleRepo, UserStatusRepo};
use conjunto_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn load_role(pool: &DbPool, id: DbId) -> AppResult<RoleWithPermissions> {
    let role = RoleRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Role", id))?;
    let permissions = RoleRepo::permission_codes(pool, id).await?;
    Ok(RoleWithPermissions { role, permissions })
}

/// GET /api/v1/roles
pub async fn list_roles(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RoleWithPermissions>>>> {
    auth.require(MODULE_ROLES, ACTION_READ)?;

    let roles = RoleRepo::list(&state.pool).await?;
    let mut data = Vec::with_capacity(roles.len());
    for role in roles {
        let permissions = RoleRepo::permission_codes(&state.pool, role.id).await?;
        data.push(RoleWithPermissions { role, permissions });
    }
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/roles/{id}
pub async fn get_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RoleWithPermissions>>> {
    auth.require(MODULE_ROLES, ACTION_READ)?;
    let data = load_role(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/roles
pub async fn create_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<DataResponse<RoleWithPermissions>>)> {
    auth.require(MODULE_ROLES, ACTION_CREATE)?;
    input.validate()?;

    let role = RoleRepo::create(&state.pool, &input).await?;
    tracing::info!(role_id = role.id, name = %role.name, "Role created");

    let data = load_role(&state.pool, role.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// PUT /api/v1/roles/{id}/permissions
///
/// Replace the role's permission set. Existing tokens keep their old
/// permissions until the holder logs in again.
pub async fn set_role_permissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetRolePermissions>,
) -> AppResult<Json<DataResponse<RoleWithPermissions>>> {
    auth.require(MODULE_ROLES, ACTION_UPDATE)?;

    let updated = RoleRepo::set_permissions(&state.pool, id, &input.permission_ids).await?;
    if !updated {
        return Err(AppError::not_found("Role", id));
    }
    tracing::info!(role_id = id, count = input.permission_ids.len(), "Role permissions replaced");

    let data = load_role(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/roles/{id}
pub async fn delete_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_ROLES, ACTION_DELETE)?;

    let role = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Role", id))?;
    if role.is_system {
        return Err(AppError::conflict(format!(
            "System role '{}' cannot be deleted",
            role.name
        )));
    }

    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Role", id));
    }
    tracing::info!(role_id = id, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/modules
pub async fn list_modules(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Module>>>> {
    auth.require(MODULE_ROLES, ACTION_READ)?;
    let data = ModuleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/permissions
pub async fn list_permissions(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    auth.require(MODULE_ROLES, ACTION_READ)?;
    let data = PermissionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user-statuses
pub async fn list_user_statuses(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserStatusRow>>>> {
    auth.require(MODULE_USERS, ACTION_READ)?;
    let data = UserStatusRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}
