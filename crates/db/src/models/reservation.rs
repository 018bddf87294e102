//! Common-area reservation model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::{Cop, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `reservations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: DbId,
    pub area: String,
    pub user_id: DbId,
    pub apartment_id: Option<DbId>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub guests: i32,
    pub cost: Cop,
    pub deposit: Cop,
    pub status: String,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub tracking: Json<Vec<TrackingEntry>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO. Duration, cost and deposit come from the area quote.
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub area: String,
    pub user_id: DbId,
    pub apartment_id: Option<DbId>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub guests: i32,
    pub cost: Cop,
    pub deposit: Cop,
    pub notes: Option<String>,
    pub tracking: Vec<TrackingEntry>,
}

/// Filters accepted by the reservation list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationFilter {
    pub area: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub user_id: Option<DbId>,
}
