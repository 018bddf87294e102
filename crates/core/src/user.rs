//! Resident profile rules: enumerations, e-mail normalisation, phone format.

use std::sync::LazyLock;

use regex::Regex;

pub const RESIDENT_OWNER: &str = "owner";
pub const RESIDENT_TENANT: &str = "tenant";
pub const RESIDENT_FAMILY_MEMBER: &str = "family_member";
pub const RESIDENT_STAFF: &str = "staff";

pub const VALID_RESIDENT_TYPES: &[&str] = &[
    RESIDENT_OWNER,
    RESIDENT_TENANT,
    RESIDENT_FAMILY_MEMBER,
    RESIDENT_STAFF,
];

/// Cédula de ciudadanía.
pub const DOCUMENT_CC: &str = "CC";
/// Cédula de extranjería.
pub const DOCUMENT_CE: &str = "CE";
/// Tarjeta de identidad.
pub const DOCUMENT_TI: &str = "TI";
pub const DOCUMENT_PASSPORT: &str = "PP";
pub const DOCUMENT_NIT: &str = "NIT";

pub const VALID_DOCUMENT_TYPES: &[&str] = &[
    DOCUMENT_CC,
    DOCUMENT_CE,
    DOCUMENT_TI,
    DOCUMENT_PASSPORT,
    DOCUMENT_NIT,
];

pub const SPECIES_DOG: &str = "dog";
pub const SPECIES_CAT: &str = "cat";
pub const SPECIES_BIRD: &str = "bird";
pub const SPECIES_FISH: &str = "fish";
pub const SPECIES_OTHER: &str = "other";

pub const VALID_PET_SPECIES: &[&str] = &[
    SPECIES_DOG,
    SPECIES_CAT,
    SPECIES_BIRD,
    SPECIES_FISH,
    SPECIES_OTHER,
];

/// Minimum password length on user creation and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Lower-case and trim an e-mail address before storing or looking it up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate that a password meets the minimum length.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid regex"));

/// Accepts 7 to 15 digits with an optional leading `+`; spaces and dashes are ignored.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if PHONE_RE.is_match(&compact) {
        Ok(())
    } else {
        Err(format!("Invalid phone number '{phone}'"))
    }
}
