//! Tower and apartment rules.

pub const MIN_TOWER_FLOORS: i32 = 1;
pub const MAX_TOWER_FLOORS: i32 = 60;

pub const MAX_ROOMS: i32 = 10;

pub const OCCUPANCY_VACANT: &str = "vacant";
pub const OCCUPANCY_OWNER_OCCUPIED: &str = "owner_occupied";
pub const OCCUPANCY_RENTED: &str = "rented";

pub const VALID_OCCUPANCIES: &[&str] = &[
    OCCUPANCY_VACANT,
    OCCUPANCY_OWNER_OCCUPIED,
    OCCUPANCY_RENTED,
];

/// An apartment must sit on a floor that exists in its tower.
pub fn validate_floor(floor: i32, tower_floors: i32) -> Result<(), String> {
    if floor < 1 || floor > tower_floors {
        return Err(format!(
            "Floor {floor} is outside the tower's range 1..={tower_floors}"
        ));
    }
    Ok(())
}

/// Validate a usable area in square metres.
pub fn validate_area(area_m2: f64) -> Result<(), String> {
    if !area_m2.is_finite() || area_m2 <= 0.0 {
        return Err(format!("Area must be a positive number, got {area_m2}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_must_exist_in_tower() {
        assert!(validate_floor(1, 12).is_ok());
        assert!(validate_floor(12, 12).is_ok());
        assert!(validate_floor(0, 12).is_err());
        assert!(validate_floor(13, 12).is_err());
    }

    #[test]
    fn area_must_be_positive_and_finite() {
        assert!(validate_area(54.5).is_ok());
        assert!(validate_area(0.0).is_err());
        assert!(validate_area(-3.0).is_err());
        assert!(validate_area(f64::NAN).is_err());
    }
}
