//! Entities that admins may delete in bulk, and the tables backing them.

/// Maximum ids accepted by one bulk delete.
pub const MAX_BULK_IDS: usize = 500;

const BULK_ENTITIES: &[(&str, &str)] = &[
    ("users", "users"),
    ("towers", "towers"),
    ("apartments", "apartments"),
    ("parking", "parking_spots"),
    ("pqrs", "pqrs_tickets"),
    ("reservations", "reservations"),
    ("notifications", "notifications"),
    ("surveys", "surveys"),
    ("payments", "payments"),
];

/// Table name for a bulk-deletable entity, or `None` if it is not whitelisted.
pub fn table_for_entity(entity: &str) -> Option<&'static str> {
    BULK_ENTITIES
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, table)| *table)
}

/// Entity names accepted by bulk operations.
pub fn bulk_entities() -> impl Iterator<Item = &'static str> {
    BULK_ENTITIES.iter().map(|(name, _)| *name)
}

/// Validate the id list of a bulk request.
pub fn validate_ids(ids: &[i64]) -> Result<(), String> {
    if ids.is_empty() {
        return Err("At least one id is required".to_string());
    }
    if ids.len() > MAX_BULK_IDS {
        return Err(format!(
            "At most {MAX_BULK_IDS} ids per request, got {}",
            ids.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelisted_entities_resolve_to_tables() {
        assert_eq!(table_for_entity("pqrs"), Some("pqrs_tickets"));
        assert_eq!(table_for_entity("parking"), Some("parking_spots"));
        assert_eq!(table_for_entity("roles"), None);
        assert_eq!(table_for_entity("users; DROP TABLE users"), None);
    }

    #[test]
    fn entity_list_matches_lookup() {
        for entity in bulk_entities() {
            assert!(table_for_entity(entity).is_some());
        }
    }

    #[test]
    fn id_list_bounds() {
        assert!(validate_ids(&[]).is_err());
        assert!(validate_ids(&[1, 2]).is_ok());
        assert!(validate_ids(&vec![1; MAX_BULK_IDS + 1]).is_err());
    }
}
