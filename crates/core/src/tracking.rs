//! Status-history entries embedded in PQRS tickets and reservations.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// One step in a record's status history, stored inside a JSONB array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<DbId>,
    pub at: Timestamp,
}

impl TrackingEntry {
    pub fn new(status: &str, note: Option<String>, actor_id: Option<DbId>, at: Timestamp) -> Self {
        Self {
            status: status.to_string(),
            note,
            actor_id,
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_optional_fields_are_omitted_from_json() {
        let entry = TrackingEntry::new("open", None, None, chrono::Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "open");
        assert!(json.get("note").is_none());
        assert!(json.get("actor_id").is_none());
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let entry: TrackingEntry =
            serde_json::from_str(r#"{"status":"closed","at":"2026-01-05T10:00:00Z"}"#).unwrap();
        assert_eq!(entry.status, "closed");
        assert_eq!(entry.note, None);
    }
}
