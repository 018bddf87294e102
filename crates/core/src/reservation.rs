//! Common-area reservation rules.
//!
//! Each bookable area carries its own rate, deposit, capacity, maximum length
//! and opening hours. A request is quoted (duration, cost, deposit) by
//! [`quote`], which also enforces those limits.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::types::Cop;
use crate::validation::check_transition;

pub const AREA_SOCIAL_HALL: &str = "social_hall";
pub const AREA_BBQ: &str = "bbq";
pub const AREA_POOL: &str = "pool";
pub const AREA_GYM: &str = "gym";
pub const AREA_SPORTS_COURT: &str = "sports_court";
pub const AREA_MEETING_ROOM: &str = "meeting_room";

pub const VALID_AREAS: &[&str] = &[
    AREA_SOCIAL_HALL,
    AREA_BBQ,
    AREA_POOL,
    AREA_GYM,
    AREA_SPORTS_COURT,
    AREA_MEETING_ROOM,
];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_COMPLETED: &str = "completed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_CONFIRMED,
    STATUS_REJECTED,
    STATUS_CANCELLED,
    STATUS_COMPLETED,
];

/// Reservations in these statuses hold their time slot.
pub const BLOCKING_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_CONFIRMED];

/// Booking limits for one common area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaRules {
    pub area: &'static str,
    pub hourly_rate: Cop,
    pub deposit: Cop,
    pub max_guests: i32,
    pub max_hours: i64,
    /// Opening hour (inclusive), 24h clock.
    pub opens_at: u32,
    /// Closing hour; a reservation may end exactly at this hour.
    pub closes_at: u32,
}

const AREAS: &[AreaRules] = &[
    AreaRules {
        area: AREA_SOCIAL_HALL,
        hourly_rate: 25_000,
        deposit: 200_000,
        max_guests: 80,
        max_hours: 8,
        opens_at: 8,
        closes_at: 23,
    },
    AreaRules {
        area: AREA_BBQ,
        hourly_rate: 15_000,
        deposit: 50_000,
        max_guests: 20,
        max_hours: 5,
        opens_at: 10,
        closes_at: 22,
    },
    AreaRules {
        area: AREA_POOL,
        hourly_rate: 0,
        deposit: 0,
        max_guests: 15,
        max_hours: 3,
        opens_at: 7,
        closes_at: 20,
    },
    AreaRules {
        area: AREA_GYM,
        hourly_rate: 0,
        deposit: 0,
        max_guests: 5,
        max_hours: 2,
        opens_at: 5,
        closes_at: 22,
    },
    AreaRules {
        area: AREA_SPORTS_COURT,
        hourly_rate: 10_000,
        deposit: 0,
        max_guests: 20,
        max_hours: 2,
        opens_at: 6,
        closes_at: 22,
    },
    AreaRules {
        area: AREA_MEETING_ROOM,
        hourly_rate: 8_000,
        deposit: 0,
        max_guests: 12,
        max_hours: 4,
        opens_at: 7,
        closes_at: 21,
    },
];

/// Look up the booking rules for an area.
pub fn area_rules(area: &str) -> Option<&'static AreaRules> {
    AREAS.iter().find(|rules| rules.area == area)
}

/// Minutes between `start` and `end`; `end` must be strictly later.
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> Result<i64, String> {
    let minutes = (end - start).num_minutes();
    if minutes <= 0 {
        return Err(format!(
            "End time {end} must be after start time {start}"
        ));
    }
    Ok(minutes)
}

/// Cost of `minutes` at `hourly_rate`, rounded up to the next peso.
pub fn cost_for(hourly_rate: Cop, minutes: i64) -> Cop {
    (hourly_rate * minutes + 59) / 60
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// Derived values stored on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub duration_minutes: i32,
    pub cost: Cop,
    pub deposit: Cop,
}

/// Check a request against the area's rules and compute its derived fields.
pub fn quote(
    area: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    guests: i32,
    today: NaiveDate,
) -> Result<Quote, String> {
    let rules = area_rules(area).ok_or_else(|| {
        format!(
            "Invalid area '{area}'. Must be one of: {}",
            VALID_AREAS.join(", ")
        )
    })?;

    if date < today {
        return Err(format!("Cannot reserve a past date ({date})"));
    }

    let minutes = duration_minutes(start, end)?;
    if minutes > rules.max_hours * 60 {
        return Err(format!(
            "{area} can be reserved for at most {} hours",
            rules.max_hours
        ));
    }

    let ends_after_closing = end.hour() > rules.closes_at
        || (end.hour() == rules.closes_at && (end.minute() > 0 || end.second() > 0));
    if start.hour() < rules.opens_at || ends_after_closing {
        return Err(format!(
            "{area} is open from {:02}:00 to {:02}:00",
            rules.opens_at, rules.closes_at
        ));
    }

    if guests < 0 || guests > rules.max_guests {
        return Err(format!(
            "{area} admits between 0 and {} guests, got {guests}",
            rules.max_guests
        ));
    }

    let duration_minutes =
        i32::try_from(minutes).map_err(|_| "Reservation is too long".to_string())?;

    Ok(Quote {
        duration_minutes,
        cost: cost_for(rules.hourly_rate, minutes),
        deposit: rules.deposit,
    })
}

pub mod state_machine {
    use super::*;

    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            STATUS_PENDING => &[STATUS_CONFIRMED, STATUS_REJECTED, STATUS_CANCELLED],
            STATUS_CONFIRMED => &[STATUS_CANCELLED, STATUS_COMPLETED],
            _ => &[],
        }
    }

    pub fn can_transition(from: &str, to: &str) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        check_transition("reservation", valid_transitions(from), from, to)
    }
}

/// Cancelling must state why.
pub fn validate_reason(to: &str, reason: Option<&str>) -> Result<(), String> {
    let has_reason = reason.is_some_and(|r| !r.trim().is_empty());
    if to == STATUS_CANCELLED && !has_reason {
        return Err("A cancellation reason is required".to_string());
    }
    Ok(())
}
