//! PQRS (petition, complaint, claim, suggestion) rules.
//!
//! Covers the enumerations stored on a ticket, the SLA windows derived from
//! priority, the status state machine and the lifecycle timestamps each
//! transition sets, plus ticket-number formatting.

use chrono::Duration;
use serde::Serialize;

use crate::types::Timestamp;
use crate::validation::check_transition;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

pub const KIND_PETITION: &str = "petition";
pub const KIND_COMPLAINT: &str = "complaint";
pub const KIND_CLAIM: &str = "claim";
pub const KIND_SUGGESTION: &str = "suggestion";

pub const VALID_KINDS: &[&str] = &[KIND_PETITION, KIND_COMPLAINT, KIND_CLAIM, KIND_SUGGESTION];

pub const VALID_CATEGORIES: &[&str] = &[
    "maintenance",
    "security",
    "cleaning",
    "noise",
    "parking",
    "administration",
    "common_areas",
    "other",
];

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_URGENT];

/// Priority applied when a ticket is filed without one.
pub const DEFAULT_PRIORITY: &str = PRIORITY_MEDIUM;

pub const STATUS_OPEN: &str = "open";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_CLOSED: &str = "closed";
pub const STATUS_REJECTED: &str = "rejected";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_RESOLVED,
    STATUS_CLOSED,
    STATUS_REJECTED,
];

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

// ---------------------------------------------------------------------------
// SLA
// ---------------------------------------------------------------------------

/// Response and resolution windows for one priority, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaWindow {
    pub response_hours: i64,
    pub resolution_hours: i64,
}

/// Look up the SLA window for a priority. Unknown priorities yield `None`.
pub fn sla_window(priority: &str) -> Option<SlaWindow> {
    let (response_hours, resolution_hours) = match priority {
        PRIORITY_URGENT => (2, 24),
        PRIORITY_HIGH => (8, 72),
        PRIORITY_MEDIUM => (24, 120),
        PRIORITY_LOW => (48, 240),
        _ => return None,
    };
    Some(SlaWindow {
        response_hours,
        resolution_hours,
    })
}

/// Absolute deadlines for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaDeadlines {
    pub response_due_at: Timestamp,
    pub resolution_due_at: Timestamp,
}

/// Compute deadlines counted from the ticket's creation time.
pub fn compute_deadlines(created_at: Timestamp, priority: &str) -> Result<SlaDeadlines, String> {
    let window = sla_window(priority).ok_or_else(|| format!("Unknown priority '{priority}'"))?;
    Ok(SlaDeadlines {
        response_due_at: created_at + Duration::hours(window.response_hours),
        resolution_due_at: created_at + Duration::hours(window.resolution_hours),
    })
}

/// SLA standing of a ticket at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaState {
    OnTime,
    /// At least three quarters of the resolution window has elapsed.
    AtRisk,
    Breached,
}

impl SlaState {
    pub fn as_str(self) -> &'static str {
        match self {
            SlaState::OnTime => "on_time",
            SlaState::AtRisk => "at_risk",
            SlaState::Breached => "breached",
        }
    }
}

/// Evaluate the resolution SLA.
///
/// A resolved ticket is judged by when it was resolved and a ticket closed
/// without resolution by when it was closed. Rejected tickets leave the SLA
/// and always read as on time. Anything else is judged by how much of its
/// window has elapsed at `now`.
pub fn sla_state(
    status: &str,
    created_at: Timestamp,
    resolution_due_at: Timestamp,
    lifecycle: &Lifecycle,
    now: Timestamp,
) -> SlaState {
    if status == STATUS_REJECTED {
        return SlaState::OnTime;
    }
    let finished_at = lifecycle.resolved_at.or(match status {
        STATUS_CLOSED => lifecycle.closed_at,
        _ => None,
    });
    if let Some(finished) = finished_at {
        return if finished > resolution_due_at {
            SlaState::Breached
        } else {
            SlaState::OnTime
        };
    }
    if now > resolution_due_at {
        return SlaState::Breached;
    }
    let window = (resolution_due_at - created_at).num_seconds();
    let elapsed = (now - created_at).num_seconds();
    if window <= 0 || elapsed * 4 >= window * 3 {
        SlaState::AtRisk
    } else {
        SlaState::OnTime
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::*;

    /// Statuses reachable from `from`. Terminal and unknown statuses yield an empty slice.
    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            STATUS_OPEN => &[STATUS_IN_PROGRESS, STATUS_REJECTED, STATUS_CLOSED],
            STATUS_IN_PROGRESS => &[STATUS_RESOLVED, STATUS_REJECTED],
            // Reopen goes back to in_progress.
            STATUS_RESOLVED => &[STATUS_CLOSED, STATUS_IN_PROGRESS],
            _ => &[],
        }
    }

    pub fn can_transition(from: &str, to: &str) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        check_transition("PQRS", valid_transitions(from), from, to)
    }
}

/// Lifecycle timestamps derived from status changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifecycle {
    pub first_response_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
}

/// Validate `from -> to` and update the lifecycle timestamps accordingly.
///
/// - leaving `open` records the first response (once)
/// - entering `resolved` sets `resolved_at`; reopening clears it
/// - entering `closed` sets `closed_at`
pub fn apply_transition(
    lifecycle: &mut Lifecycle,
    from: &str,
    to: &str,
    at: Timestamp,
) -> Result<(), String> {
    state_machine::validate_transition(from, to)?;

    if from == STATUS_OPEN && lifecycle.first_response_at.is_none() {
        lifecycle.first_response_at = Some(at);
    }
    match to {
        STATUS_RESOLVED => lifecycle.resolved_at = Some(at),
        STATUS_IN_PROGRESS if from == STATUS_RESOLVED => lifecycle.resolved_at = None,
        STATUS_CLOSED => lifecycle.closed_at = Some(at),
        _ => {}
    }
    Ok(())
}

/// Subject, description, category, priority and assignee can only change
/// while the ticket is still being worked.
pub fn is_editable(status: &str) -> bool {
    matches!(status, STATUS_OPEN | STATUS_IN_PROGRESS)
}

/// Satisfaction can be rated once the ticket is resolved or closed.
pub fn validate_rating(status: &str, rating: i16) -> Result<(), String> {
    if !matches!(status, STATUS_RESOLVED | STATUS_CLOSED) {
        return Err(format!(
            "A ticket in status '{status}' cannot be rated yet"
        ));
    }
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        ));
    }
    Ok(())
}

/// Format a ticket number such as `PQRS-2026-000042`.
pub fn format_ticket_number(year: i32, sequence: i64) -> String {
    format!("PQRS-{year}-{sequence:06}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn t(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn urgent_tickets_have_the_tightest_window() {
        let deadlines = compute_deadlines(t(8), PRIORITY_URGENT).unwrap();
        assert_eq!(deadlines.response_due_at, t(10));
        assert_eq!(deadlines.resolution_due_at, t(8) + Duration::hours(24));
    }

    #[test]
    fn every_priority_has_a_window() {
        for p in VALID_PRIORITIES {
            let w = sla_window(p).unwrap();
            assert!(w.response_hours < w.resolution_hours, "{p}");
        }
        assert_eq!(sla_window("critical"), None);
    }

    #[test]
    fn unknown_priority_cannot_compute_deadlines() {
        assert!(compute_deadlines(t(8), "whenever").is_err());
    }

    fn open_lifecycle() -> Lifecycle {
        Lifecycle::default()
    }

    #[test]
    fn sla_on_time_early_in_window() {
        let created = t(0);
        let due = created + Duration::hours(24);
        let state = sla_state(STATUS_OPEN, created, due, &open_lifecycle(), t(6));
        assert_eq!(state, SlaState::OnTime);
    }

    #[test]
    fn sla_at_risk_after_three_quarters() {
        let created = t(0);
        let due = created + Duration::hours(24);
        let state = sla_state(STATUS_IN_PROGRESS, created, due, &open_lifecycle(), t(18));
        assert_eq!(state, SlaState::AtRisk);
    }

    #[test]
    fn sla_breached_past_due_while_unresolved() {
        let created = t(0);
        let due = created + Duration::hours(2);
        let state = sla_state(STATUS_OPEN, created, due, &open_lifecycle(), t(3));
        assert_eq!(state, SlaState::Breached);
    }

    #[test]
    fn resolved_ticket_is_judged_by_resolution_time() {
        let created = t(0);
        let due = created + Duration::hours(2);
        let late_now = t(20);
        let on_time = Lifecycle { resolved_at: Some(t(1)), ..Lifecycle::default() };
        let late = Lifecycle { resolved_at: Some(t(3)), ..Lifecycle::default() };
        assert_eq!(
            sla_state(STATUS_RESOLVED, created, due, &on_time, late_now),
            SlaState::OnTime
        );
        assert_eq!(
            sla_state(STATUS_RESOLVED, created, due, &late, late_now),
            SlaState::Breached
        );
    }

    #[test]
    fn ticket_closed_without_resolution_stops_ageing() {
        let created = t(0);
        let due = compute_deadlines(created, PRIORITY_URGENT).unwrap().resolution_due_at;
        let mut lc = Lifecycle::default();
        apply_transition(&mut lc, STATUS_OPEN, STATUS_CLOSED, t(1)).unwrap();

        let month_later = created + Duration::days(30);
        assert_eq!(
            sla_state(STATUS_CLOSED, created, due, &lc, month_later),
            SlaState::OnTime
        );
    }

    #[test]
    fn ticket_closed_after_its_deadline_stays_breached() {
        let created = t(0);
        let due = created + Duration::hours(2);
        let mut lc = Lifecycle::default();
        apply_transition(&mut lc, STATUS_OPEN, STATUS_CLOSED, t(5)).unwrap();

        let state = sla_state(STATUS_CLOSED, created, due, &lc, t(5) + Duration::days(30));
        assert_eq!(state, SlaState::Breached);
    }

    #[test]
    fn rejected_tickets_leave_the_sla() {
        let created = t(0);
        let due = created + Duration::hours(2);
        let month_later = created + Duration::days(30);

        let mut from_open = Lifecycle::default();
        apply_transition(&mut from_open, STATUS_OPEN, STATUS_REJECTED, t(1)).unwrap();
        assert_eq!(
            sla_state(STATUS_REJECTED, created, due, &from_open, month_later),
            SlaState::OnTime
        );

        let mut from_in_progress = Lifecycle::default();
        apply_transition(&mut from_in_progress, STATUS_OPEN, STATUS_IN_PROGRESS, t(1)).unwrap();
        apply_transition(&mut from_in_progress, STATUS_IN_PROGRESS, STATUS_REJECTED, t(4))
            .unwrap();
        assert_eq!(
            sla_state(STATUS_REJECTED, created, due, &from_in_progress, month_later),
            SlaState::OnTime
        );
    }

    #[test]
    fn sla_state_serializes_snake_case() {
        assert_eq!(serde_json::to_value(SlaState::AtRisk).unwrap(), "at_risk");
        assert_eq!(SlaState::AtRisk.as_str(), "at_risk");
    }

    #[test]
    fn closed_and_rejected_are_terminal() {
        assert!(state_machine::valid_transitions(STATUS_CLOSED).is_empty());
        assert!(state_machine::valid_transitions(STATUS_REJECTED).is_empty());
    }

    #[test]
    fn open_cannot_jump_to_resolved() {
        assert!(!state_machine::can_transition(STATUS_OPEN, STATUS_RESOLVED));
        assert_matches!(
            state_machine::validate_transition(STATUS_OPEN, STATUS_RESOLVED),
            Err(msg) if msg.contains("open -> resolved")
        );
    }

    #[test]
    fn first_response_is_recorded_once() {
        let mut lc = Lifecycle::default();
        apply_transition(&mut lc, STATUS_OPEN, STATUS_IN_PROGRESS, t(1)).unwrap();
        assert_eq!(lc.first_response_at, Some(t(1)));

        apply_transition(&mut lc, STATUS_IN_PROGRESS, STATUS_RESOLVED, t(2)).unwrap();
        apply_transition(&mut lc, STATUS_RESOLVED, STATUS_IN_PROGRESS, t(3)).unwrap();
        assert_eq!(lc.first_response_at, Some(t(1)));
    }

    #[test]
    fn reopen_clears_resolved_at() {
        let mut lc = Lifecycle::default();
        apply_transition(&mut lc, STATUS_IN_PROGRESS, STATUS_RESOLVED, t(2)).unwrap();
        assert_eq!(lc.resolved_at, Some(t(2)));
        apply_transition(&mut lc, STATUS_RESOLVED, STATUS_IN_PROGRESS, t(4)).unwrap();
        assert_eq!(lc.resolved_at, None);
    }

    #[test]
    fn closing_sets_closed_at_and_keeps_resolution() {
        let mut lc = Lifecycle::default();
        apply_transition(&mut lc, STATUS_IN_PROGRESS, STATUS_RESOLVED, t(2)).unwrap();
        apply_transition(&mut lc, STATUS_RESOLVED, STATUS_CLOSED, t(5)).unwrap();
        assert_eq!(lc.resolved_at, Some(t(2)));
        assert_eq!(lc.closed_at, Some(t(5)));
    }

    #[test]
    fn invalid_transition_leaves_lifecycle_untouched() {
        let mut lc = Lifecycle::default();
        assert!(apply_transition(&mut lc, STATUS_CLOSED, STATUS_OPEN, t(2)).is_err());
        assert_eq!(lc, Lifecycle::default());
    }

    #[test]
    fn rating_requires_finished_ticket_and_range() {
        assert!(validate_rating(STATUS_RESOLVED, 5).is_ok());
        assert!(validate_rating(STATUS_CLOSED, 1).is_ok());
        assert!(validate_rating(STATUS_OPEN, 4).is_err());
        assert!(validate_rating(STATUS_CLOSED, 6).is_err());
        assert!(validate_rating(STATUS_CLOSED, 0).is_err());
    }

    #[test]
    fn only_active_tickets_are_editable() {
        assert!(is_editable(STATUS_OPEN));
        assert!(is_editable(STATUS_IN_PROGRESS));
        assert!(!is_editable(STATUS_RESOLVED));
    }

    #[test]
    fn ticket_number_is_zero_padded() {
        assert_eq!(format_ticket_number(2026, 42), "PQRS-2026-000042");
        assert_eq!(format_ticket_number(2026, 1_234_567), "PQRS-2026-1234567");
    }
}
