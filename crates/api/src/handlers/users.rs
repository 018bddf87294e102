//! Handlers for the `/users` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use conjunto_core::roles::{ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_USERS};
use conjunto_core::types::DbId;
use conjunto_core::user::{
    normalize_email, validate_password_strength, validate_phone, MIN_PASSWORD_LENGTH,
    VALID_DOCUMENT_TYPES, VALID_PET_SPECIES, VALID_RESIDENT_TYPES,
};
use conjunto_db::models::status::{StatusId, UserStatus};
use conjunto_db::models::user::{
    CreateUser, Pet, UpdateUser, User, UserFilter, UserProfile, UserResponse,
};
use conjunto_db::repositories::{ApartmentRepo, RoleRepo, UserRepo};
use conjunto_db::DbPool;
use serde::Deserialize;
use validator::{Validate, ValidateEmail};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::check_one_of;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub role_id: DbId,
    pub status_id: Option<StatusId>,
    pub apartment_id: Option<DbId>,
    pub resident_type: Option<String>,
    #[validate(nested)]
    pub profile: UserProfile,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// Request body for `PUT /users/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status_id: StatusId,
}

/// Request body for `PUT /users/{id}/pets`.
#[derive(Debug, Deserialize)]
pub struct SetPetsRequest {
    pub pets: Vec<Pet>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_profile(profile: &UserProfile) -> AppResult<()> {
    profile.validate()?;
    check_one_of("document_type", &profile.document_type, VALID_DOCUMENT_TYPES)?;
    validate_phone(&profile.phone).map_err(AppError::invalid)?;
    if let Some(contact) = &profile.emergency_contact {
        validate_phone(&contact.phone).map_err(AppError::invalid)?;
    }
    Ok(())
}

fn validate_pets(pets: &[Pet]) -> AppResult<()> {
    for pet in pets {
        if pet.name.trim().is_empty() {
            return Err(AppError::invalid("Pet name must not be empty"));
        }
        check_one_of("species", &pet.species, VALID_PET_SPECIES)?;
    }
    Ok(())
}

fn parse_status(status_id: StatusId) -> AppResult<UserStatus> {
    UserStatus::from_id(status_id)
        .ok_or_else(|| AppError::invalid(format!("Unknown user status {status_id}")))
}

async fn ensure_role(pool: &DbPool, role_id: DbId) -> AppResult<()> {
    if RoleRepo::find_by_id(pool, role_id).await?.is_none() {
        return Err(AppError::invalid(format!("Unknown role {role_id}")));
    }
    Ok(())
}

async fn ensure_apartment(pool: &DbPool, apartment_id: DbId) -> AppResult<()> {
    if ApartmentRepo::find_by_id(pool, apartment_id).await?.is_none() {
        return Err(AppError::invalid(format!("Unknown apartment {apartment_id}")));
    }
    Ok(())
}

async fn to_response(pool: &DbPool, user: User) -> AppResult<UserResponse> {
    let role = RoleRepo::resolve_name(pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users
pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    auth.require(MODULE_USERS, ACTION_CREATE)?;

    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH).map_err(AppError::invalid)?;
    if let Some(resident_type) = &input.resident_type {
        check_one_of("resident_type", resident_type, VALID_RESIDENT_TYPES)?;
    }
    validate_profile(&input.profile)?;
    validate_pets(&input.pets)?;
    let status = input.status_id.map(parse_status).transpose()?;

    ensure_role(&state.pool, input.role_id).await?;
    if let Some(apartment_id) = input.apartment_id {
        ensure_apartment(&state.pool, apartment_id).await?;
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        email: normalize_email(&input.email),
        password_hash,
        role_id: input.role_id,
        status_id: status.map(UserStatus::id),
        apartment_id: input.apartment_id,
        resident_type: input.resident_type,
        profile: input.profile,
        pets: input.pets,
    };

    let user = UserRepo::create(&state.pool, &create).await?;
    tracing::info!(user_id = user.id, created_by = auth.user_id, "User created");

    let data = to_response(&state.pool, user).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/users
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    auth.require(MODULE_USERS, ACTION_READ)?;

    let roles: HashMap<DbId, String> = RoleRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let users = UserRepo::list(&state.pool, &filter, page.limit, page.offset).await?;
    let data = users
        .into_iter()
        .map(|u| {
            let role = roles.get(&u.role_id).cloned().unwrap_or_default();
            UserResponse::from_user(u, role)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/users/{id}
///
/// Users may always read their own record.
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if auth.user_id != id {
        auth.require(MODULE_USERS, ACTION_READ)?;
    }

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("User", id))?;
    let data = to_response(&state.pool, user).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.require(MODULE_USERS, ACTION_UPDATE)?;

    if let Some(email) = &input.email {
        if !email.validate_email() {
            return Err(AppError::invalid(format!("Invalid email '{email}'")));
        }
        input.email = Some(normalize_email(email));
    }
    if let Some(resident_type) = &input.resident_type {
        check_one_of("resident_type", resident_type, VALID_RESIDENT_TYPES)?;
    }
    if let Some(profile) = &input.profile {
        validate_profile(profile)?;
    }
    if let Some(role_id) = input.role_id {
        ensure_role(&state.pool, role_id).await?;
    }
    if let Some(apartment_id) = input.apartment_id {
        ensure_apartment(&state.pool, apartment_id).await?;
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("User", id))?;
    tracing::info!(user_id = id, updated_by = auth.user_id, "User updated");

    let data = to_response(&state.pool, user).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/users/{id}/status
pub async fn set_user_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.require(MODULE_USERS, ACTION_UPDATE)?;

    let status = parse_status(input.status_id)?;
    if id == auth.user_id {
        return Err(AppError::conflict("You cannot change your own status"));
    }

    let user = UserRepo::set_status(&state.pool, id, status.id())
        .await?
        .ok_or(AppError::not_found("User", id))?;
    tracing::info!(user_id = id, status = ?status, "User status changed");

    let data = to_response(&state.pool, user).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/users/{id}/pets
///
/// Replaces the whole pet list. Residents may manage their own pets.
pub async fn set_user_pets(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetPetsRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if auth.user_id != id {
        auth.require(MODULE_USERS, ACTION_UPDATE)?;
    }
    validate_pets(&input.pets)?;

    let user = UserRepo::replace_pets(&state.pool, id, &input.pets)
        .await?
        .ok_or(AppError::not_found("User", id))?;

    let data = to_response(&state.pool, user).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_USERS, ACTION_DELETE)?;
    if id == auth.user_id {
        return Err(AppError::conflict("You cannot delete your own account"));
    }

    let deleted = UserRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(user_id = id, deleted_by = auth.user_id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("User", id))
    }
}
