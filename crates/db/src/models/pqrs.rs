//! PQRS ticket model and DTOs.

use conjunto_core::pqrs::{sla_state, Lifecycle, SlaState};
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `pqrs_tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PqrsTicket {
    pub id: DbId,
    pub ticket_number: String,
    pub kind: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub subject: String,
    pub description: String,
    pub requester_id: DbId,
    pub apartment_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub response_due_at: Timestamp,
    pub resolution_due_at: Timestamp,
    pub first_response_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub satisfaction_rating: Option<i16>,
    pub tracking: Json<Vec<TrackingEntry>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PqrsTicket {
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle {
            first_response_at: self.first_response_at,
            resolved_at: self.resolved_at,
            closed_at: self.closed_at,
        }
    }

    pub fn sla_state(&self, now: Timestamp) -> SlaState {
        sla_state(
            &self.status,
            self.created_at,
            self.resolution_due_at,
            &self.lifecycle(),
            now,
        )
    }
}

/// A ticket with its SLA standing evaluated at read time.
#[derive(Debug, Clone, Serialize)]
pub struct PqrsTicketView {
    #[serde(flatten)]
    pub ticket: PqrsTicket,
    pub sla_state: SlaState,
}

impl PqrsTicketView {
    pub fn new(ticket: PqrsTicket, now: Timestamp) -> Self {
        let sla_state = ticket.sla_state(now);
        Self { ticket, sla_state }
    }
}

/// Insert DTO. Ticket number, deadlines and the first tracking entry are
/// derived by the caller.
#[derive(Debug, Clone)]
pub struct CreatePqrsTicket {
    pub ticket_number: String,
    pub kind: String,
    pub category: String,
    pub priority: String,
    pub subject: String,
    pub description: String,
    pub requester_id: DbId,
    pub apartment_id: Option<DbId>,
    pub response_due_at: Timestamp,
    pub resolution_due_at: Timestamp,
    pub tracking: Vec<TrackingEntry>,
    /// Ticket creation time; deadlines are counted from it.
    pub created_at: Timestamp,
}

/// DTO for updating a ticket's editable fields. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdatePqrsTicket {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
    pub response_due_at: Option<Timestamp>,
    pub resolution_due_at: Option<Timestamp>,
}

/// Filters accepted by the ticket list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PqrsFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub kind: Option<String>,
    pub requester_id: Option<DbId>,
}
