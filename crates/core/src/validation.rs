//! Helpers shared by the enumerated-field checks and state machines.

/// Validate that `value` is one of the `allowed` strings.
pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            allowed.join(", ")
        ))
    }
}

/// Validate a status change against the targets reachable from `from`.
pub fn check_transition(
    entity: &str,
    reachable: &[&str],
    from: &str,
    to: &str,
) -> Result<(), String> {
    if reachable.contains(&to) {
        Ok(())
    } else if reachable.is_empty() {
        Err(format!(
            "Invalid {entity} transition: '{from}' is a terminal status"
        ))
    } else {
        Err(format!(
            "Invalid {entity} transition: {from} -> {to}. Allowed: {}",
            reachable.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_of_accepts_listed_value() {
        assert!(validate_one_of("color", "red", &["red", "blue"]).is_ok());
    }

    #[test]
    fn one_of_lists_allowed_values_on_error() {
        let err = validate_one_of("color", "green", &["red", "blue"]).unwrap_err();
        assert_eq!(err, "Invalid color 'green'. Must be one of: red, blue");
    }

    #[test]
    fn terminal_status_has_dedicated_message() {
        let err = check_transition("ticket", &[], "closed", "open").unwrap_err();
        assert!(err.contains("terminal"));
    }

    #[test]
    fn unreachable_target_lists_alternatives() {
        let err = check_transition("ticket", &["b", "c"], "a", "d").unwrap_err();
        assert!(err.contains("a -> d"));
        assert!(err.contains("b, c"));
    }
}
