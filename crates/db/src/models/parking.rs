//! Parking spot model and DTOs.

use conjunto_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// Vehicle parked in an assigned spot, stored as JSONB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Normalised plate. Empty for bicycles without one.
    #[serde(default)]
    pub plate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A row from the `parking_spots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParkingSpot {
    pub id: DbId,
    pub code: String,
    pub kind: String,
    pub status: String,
    pub apartment_id: Option<DbId>,
    pub vehicle: Option<Json<Vehicle>>,
    pub assigned_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a spot. New spots are `available` unless stated otherwise.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateParkingSpot {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub kind: String,
    pub status: Option<String>,
}

/// DTO for updating a spot. Assignment goes through assign/release instead.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateParkingSpot {
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

/// Request to hand a spot to an apartment.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignParkingSpot {
    pub apartment_id: DbId,
    pub vehicle: Option<Vehicle>,
}

/// Filters accepted by the parking list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParkingFilter {
    pub status: Option<String>,
    pub kind: Option<String>,
    pub apartment_id: Option<DbId>,
}
