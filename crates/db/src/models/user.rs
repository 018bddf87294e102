//! User entity model and DTOs.

use chrono::NaiveDate;
use conjunto_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::StatusId;

/// Personal data embedded in the `profile` JSONB column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// One of `conjunto_core::user::VALID_DOCUMENT_TYPES`.
    pub document_type: String,
    #[validate(length(min = 4, max = 20))]
    pub document_number: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// A pet registered to a resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default)]
    pub vaccinated: bool,
}

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub status_id: StatusId,
    pub apartment_id: Option<DbId>,
    pub resident_type: Option<String>,
    pub profile: Json<UserProfile>,
    pub pets: Json<Vec<Pet>>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    /// Resolved role name (e.g. `"admin"`, `"resident"`).
    pub role: String,
    pub role_id: DbId,
    pub status_id: StatusId,
    pub apartment_id: Option<DbId>,
    pub resident_type: Option<String>,
    pub profile: UserProfile,
    pub pets: Vec<Pet>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: User, role: String) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role,
            role_id: user.role_id,
            status_id: user.status_id,
            apartment_id: user.apartment_id,
            resident_type: user.resident_type,
            profile: user.profile.0,
            pets: user.pets.0,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    /// Defaults to 1 (Active) if omitted.
    pub status_id: Option<StatusId>,
    pub apartment_id: Option<DbId>,
    pub resident_type: Option<String>,
    pub profile: UserProfile,
    pub pets: Vec<Pet>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub apartment_id: Option<DbId>,
    pub resident_type: Option<String>,
    pub profile: Option<UserProfile>,
}

/// Filters accepted by the user list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub status_id: Option<StatusId>,
    pub role_id: Option<DbId>,
    pub apartment_id: Option<DbId>,
}
