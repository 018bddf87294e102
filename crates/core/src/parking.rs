//! Parking spot kinds, statuses and vehicle plate formats.

use std::sync::LazyLock;

use regex::Regex;

pub const KIND_CAR: &str = "car";
pub const KIND_MOTORCYCLE: &str = "motorcycle";
pub const KIND_BICYCLE: &str = "bicycle";
pub const KIND_VISITOR: &str = "visitor";
pub const KIND_DISABLED: &str = "disabled";

pub const VALID_KINDS: &[&str] = &[
    KIND_CAR,
    KIND_MOTORCYCLE,
    KIND_BICYCLE,
    KIND_VISITOR,
    KIND_DISABLED,
];

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_ASSIGNED: &str = "assigned";
pub const STATUS_MAINTENANCE: &str = "maintenance";

pub const VALID_STATUSES: &[&str] = &[STATUS_AVAILABLE, STATUS_ASSIGNED, STATUS_MAINTENANCE];

static CAR_PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}[0-9]{3}$").expect("valid regex"));
static MOTORCYCLE_PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}[0-9]{2}[A-Z]?$").expect("valid regex"));

/// Upper-case a plate and drop spaces and dashes (`abc-123` -> `ABC123`).
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect::<String>()
        .to_uppercase()
}

/// Validate a normalised plate for the given spot kind.
///
/// Car spots take `ABC123`, motorcycle spots `ABC12` or `ABC12D`, visitor and
/// disabled spots either. Bicycles need no plate; an optional frame or
/// registration identifier of up to 20 characters is kept as given.
pub fn validate_plate(kind: &str, plate: &str) -> Result<(), String> {
    let ok = match kind {
        KIND_CAR => CAR_PLATE_RE.is_match(plate),
        KIND_MOTORCYCLE => MOTORCYCLE_PLATE_RE.is_match(plate),
        KIND_VISITOR | KIND_DISABLED => {
            CAR_PLATE_RE.is_match(plate) || MOTORCYCLE_PLATE_RE.is_match(plate)
        }
        KIND_BICYCLE => plate.chars().count() <= 20,
        other => return Err(format!("Unknown parking kind '{other}'")),
    };
    if ok {
        Ok(())
    } else {
        Err(format!("Plate '{plate}' is not valid for a {kind} spot"))
    }
}

/// Only free spots can be handed to an apartment.
pub fn can_assign(status: &str) -> bool {
    status == STATUS_AVAILABLE
}
