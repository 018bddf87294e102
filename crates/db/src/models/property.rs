//! Tower and apartment models and DTOs.

use conjunto_core::types::{Cop, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `towers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tower {
    pub id: DbId,
    pub name: String,
    pub floors: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tower.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTower {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 1, max = 60))]
    pub floors: i32,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// DTO for updating a tower. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTower {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 60))]
    pub floors: Option<i32>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// A row from the `apartments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Apartment {
    pub id: DbId,
    pub tower_id: DbId,
    pub number: String,
    pub floor: i32,
    pub area_m2: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub occupancy: String,
    pub owner_id: Option<DbId>,
    /// Monthly administration fee in COP.
    pub monthly_fee: Cop,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an apartment. The tower comes from the request path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApartment {
    #[validate(length(min = 1, max = 10))]
    pub number: String,
    pub floor: i32,
    pub area_m2: f64,
    #[validate(range(min = 0, max = 10))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub bathrooms: Option<i32>,
    /// Defaults to `vacant`.
    pub occupancy: Option<String>,
    pub owner_id: Option<DbId>,
    #[validate(range(min = 0))]
    pub monthly_fee: Option<Cop>,
}

/// DTO for updating an apartment. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateApartment {
    #[validate(length(min = 1, max = 10))]
    pub number: Option<String>,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
    #[validate(range(min = 0, max = 10))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub bathrooms: Option<i32>,
    pub occupancy: Option<String>,
    pub owner_id: Option<DbId>,
    #[validate(range(min = 0))]
    pub monthly_fee: Option<Cop>,
}
