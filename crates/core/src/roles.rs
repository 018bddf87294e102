//! Well-known role names, module codes and permission actions.
//!
//! Role and module names must match the seed rows in
//! `20260301000002_create_roles_and_permissions.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_RESIDENT: &str = "resident";
pub const ROLE_GUARD: &str = "guard";

/// Roles created by migrations. They cannot be deleted through the API.
pub const SYSTEM_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_RESIDENT, ROLE_GUARD];

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

pub const MODULE_USERS: &str = "users";
pub const MODULE_TOWERS: &str = "towers";
pub const MODULE_APARTMENTS: &str = "apartments";
pub const MODULE_PARKING: &str = "parking";
pub const MODULE_PQRS: &str = "pqrs";
pub const MODULE_RESERVATIONS: &str = "reservations";
pub const MODULE_NOTIFICATIONS: &str = "notifications";
pub const MODULE_SURVEYS: &str = "surveys";
pub const MODULE_PAYMENTS: &str = "payments";
pub const MODULE_ROLES: &str = "roles";

pub const VALID_MODULES: &[&str] = &[
    MODULE_USERS,
    MODULE_TOWERS,
    MODULE_APARTMENTS,
    MODULE_PARKING,
    MODULE_PQRS,
    MODULE_RESERVATIONS,
    MODULE_NOTIFICATIONS,
    MODULE_SURVEYS,
    MODULE_PAYMENTS,
    MODULE_ROLES,
];

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

pub const ACTION_CREATE: &str = "create";
pub const ACTION_READ: &str = "read";
pub const ACTION_UPDATE: &str = "update";
pub const ACTION_DELETE: &str = "delete";
/// Implies every other action on the same module.
pub const ACTION_MANAGE: &str = "manage";

pub const VALID_ACTIONS: &[&str] = &[
    ACTION_CREATE,
    ACTION_READ,
    ACTION_UPDATE,
    ACTION_DELETE,
    ACTION_MANAGE,
];

/// Build the `"<module>:<action>"` code carried in access tokens.
pub fn permission_code(module: &str, action: &str) -> String {
    format!("{module}:{action}")
}

/// Split a permission code into `(module, action)`.
pub fn parse_permission_code(code: &str) -> Option<(&str, &str)> {
    let (module, action) = code.split_once(':')?;
    if module.is_empty() || action.is_empty() {
        return None;
    }
    Some((module, action))
}

/// Whether a set of granted codes allows `action` on `module`.
///
/// The `admin` role is checked separately by the caller; this only looks at
/// explicit grants, where `<module>:manage` covers every action.
pub fn grants(granted: &[String], module: &str, action: &str) -> bool {
    granted.iter().any(|code| match parse_permission_code(code) {
        Some((m, a)) => m == module && (a == action || a == ACTION_MANAGE),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn permission_code_round_trips_through_parser() {
        let code = permission_code(MODULE_PQRS, ACTION_UPDATE);
        assert_eq!(code, "pqrs:update");
        assert_eq!(parse_permission_code(&code), Some(("pqrs", "update")));
    }

    #[test]
    fn malformed_codes_do_not_parse() {
        assert_eq!(parse_permission_code("pqrs"), None);
        assert_eq!(parse_permission_code(":read"), None);
        assert_eq!(parse_permission_code("pqrs:"), None);
    }

    #[test]
    fn exact_grant_allows_only_that_action() {
        let granted = codes(&["payments:read"]);
        assert!(grants(&granted, MODULE_PAYMENTS, ACTION_READ));
        assert!(!grants(&granted, MODULE_PAYMENTS, ACTION_DELETE));
        assert!(!grants(&granted, MODULE_PQRS, ACTION_READ));
    }

    #[test]
    fn manage_grant_covers_every_action_of_its_module() {
        let granted = codes(&["surveys:manage"]);
        for action in VALID_ACTIONS {
            assert!(grants(&granted, MODULE_SURVEYS, action));
        }
        assert!(!grants(&granted, MODULE_USERS, ACTION_READ));
    }

    #[test]
    fn garbage_codes_are_ignored() {
        let granted = codes(&["nonsense", "pqrs"]);
        assert!(!grants(&granted, MODULE_PQRS, ACTION_READ));
    }
}
