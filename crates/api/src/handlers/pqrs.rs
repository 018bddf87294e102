//! Handlers for the `/pqrs` resource (petitions, complaints, claims and
//! suggestions).
//!
//! Users without `pqrs:update` only see and act on tickets they filed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use conjunto_core::notification::KIND_PQRS;
use conjunto_core::pqrs::{
    apply_transition, compute_deadlines, format_ticket_number, is_editable, validate_rating,
    DEFAULT_PRIORITY, STATUS_OPEN, VALID_CATEGORIES, VALID_KINDS, VALID_PRIORITIES,
    VALID_STATUSES,
};
use conjunto_core::roles::{ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_PQRS};
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::DbId;
use conjunto_db::models::notification::NewNotification;
use conjunto_db::models::pqrs::{
    CreatePqrsTicket, PqrsFilter, PqrsTicket, PqrsTicketView, UpdatePqrsTicket,
};
use conjunto_db::repositories::{PqrsRepo, UserRepo};
use conjunto_db::DbPool;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::{check_one_of, notify};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /pqrs`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePqrsRequest {
    pub kind: String,
    pub category: String,
    pub priority: Option<String>,
    #[validate(length(min = 3, max = 200))]
    pub subject: String,
    #[validate(length(min = 10, max = 5000))]
    pub description: String,
    /// Defaults to the requester's own apartment.
    pub apartment_id: Option<DbId>,
}

/// Request body for `PUT /pqrs/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePqrsRequest {
    #[validate(length(min = 3, max = 200))]
    pub subject: Option<String>,
    #[validate(length(min = 10, max = 5000))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<DbId>,
}

/// Request body for `POST /pqrs/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct TransitionRequest {
    pub status: String,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// Request body for `POST /pqrs/{id}/rating`.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i16,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a ticket the caller may see. Others' tickets read as missing to
/// callers without `pqrs:update`.
async fn load_visible(pool: &DbPool, auth: &AuthUser, id: DbId) -> AppResult<PqrsTicket> {
    let ticket = PqrsRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("PqrsTicket", id))?;
    if ticket.requester_id != auth.user_id && !auth.can(MODULE_PQRS, ACTION_UPDATE) {
        return Err(AppError::not_found("PqrsTicket", id));
    }
    Ok(ticket)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/pqrs
pub async fn create_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePqrsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PqrsTicketView>>)> {
    auth.require(MODULE_PQRS, ACTION_CREATE)?;
    input.validate()?;
    check_one_of("kind", &input.kind, VALID_KINDS)?;
    check_one_of("category", &input.category, VALID_CATEGORIES)?;
    let priority = input.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
    check_one_of("priority", &priority, VALID_PRIORITIES)?;

    let apartment_id = match input.apartment_id {
        Some(id) => Some(id),
        None => UserRepo::find_by_id(&state.pool, auth.user_id)
            .await?
            .and_then(|u| u.apartment_id),
    };

    let now = Utc::now();
    let deadlines = compute_deadlines(now, &priority).map_err(AppError::invalid)?;
    let sequence = PqrsRepo::next_sequence(&state.pool).await?;

    let create = CreatePqrsTicket {
        ticket_number: format_ticket_number(now.year(), sequence),
        kind: input.kind,
        category: input.category,
        priority,
        subject: input.subject,
        description: input.description,
        requester_id: auth.user_id,
        apartment_id,
        response_due_at: deadlines.response_due_at,
        resolution_due_at: deadlines.resolution_due_at,
        tracking: vec![TrackingEntry::new(
            STATUS_OPEN,
            Some("Ticket filed".to_string()),
            Some(auth.user_id),
            now,
        )],
        created_at: now,
    };

    let ticket = PqrsRepo::create(&state.pool, &create).await?;
    tracing::info!(
        pqrs_id = ticket.id,
        ticket_number = %ticket.ticket_number,
        priority = %ticket.priority,
        "PQRS ticket created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PqrsTicketView::new(ticket, now),
        }),
    ))
}

/// GET /api/v1/pqrs
pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(mut filter): Query<PqrsFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PqrsTicketView>>>> {
    auth.require(MODULE_PQRS, ACTION_READ)?;
    if !auth.can(MODULE_PQRS, ACTION_UPDATE) {
        filter.requester_id = Some(auth.user_id);
    }

    let now = Utc::now();
    let tickets = PqrsRepo::list(&state.pool, &filter, page.limit, page.offset).await?;
    let data = tickets
        .into_iter()
        .map(|t| PqrsTicketView::new(t, now))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/pqrs/{id}
pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PqrsTicketView>>> {
    auth.require(MODULE_PQRS, ACTION_READ)?;
    let ticket = load_visible(&state.pool, &auth, id).await?;
    Ok(Json(DataResponse {
        data: PqrsTicketView::new(ticket, Utc::now()),
    }))
}

/// PUT /api/v1/pqrs/{id}
///
/// Changing the priority moves both SLA deadlines, still counted from the
/// ticket's creation.
pub async fn update_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePqrsRequest>,
) -> AppResult<Json<DataResponse<PqrsTicketView>>> {
    auth.require(MODULE_PQRS, ACTION_UPDATE)?;
    input.validate()?;
    if let Some(category) = &input.category {
        check_one_of("category", category, VALID_CATEGORIES)?;
    }
    if let Some(priority) = &input.priority {
        check_one_of("priority", priority, VALID_PRIORITIES)?;
    }

    let ticket = PqrsRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("PqrsTicket", id))?;
    if !is_editable(&ticket.status) {
        return Err(AppError::conflict(format!(
            "Ticket {} is {} and can no longer be edited",
            ticket.ticket_number, ticket.status
        )));
    }

    if let Some(assignee) = input.assigned_to {
        if UserRepo::find_by_id(&state.pool, assignee).await?.is_none() {
            return Err(AppError::invalid(format!("Unknown user {assignee}")));
        }
    }

    let mut update = UpdatePqrsTicket {
        subject: input.subject,
        description: input.description,
        category: input.category,
        assigned_to: input.assigned_to,
        ..Default::default()
    };
    if let Some(priority) = input.priority {
        if priority != ticket.priority {
            let deadlines =
                compute_deadlines(ticket.created_at, &priority).map_err(AppError::invalid)?;
            update.response_due_at = Some(deadlines.response_due_at);
            update.resolution_due_at = Some(deadlines.resolution_due_at);
        }
        update.priority = Some(priority);
    }

    let ticket = PqrsRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::conflict("Ticket status changed concurrently, retry"))?;
    Ok(Json(DataResponse {
        data: PqrsTicketView::new(ticket, Utc::now()),
    }))
}

/// POST /api/v1/pqrs/{id}/status
pub async fn transition_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<Json<DataResponse<PqrsTicketView>>> {
    auth.require(MODULE_PQRS, ACTION_UPDATE)?;
    input.validate()?;
    check_one_of("status", &input.status, VALID_STATUSES)?;

    let ticket = PqrsRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("PqrsTicket", id))?;

    let now = Utc::now();
    let mut lifecycle = ticket.lifecycle();
    apply_transition(&mut lifecycle, &ticket.status, &input.status, now)
        .map_err(AppError::conflict)?;

    let entry = TrackingEntry::new(&input.status, input.note, Some(auth.user_id), now);
    let updated = PqrsRepo::transition(
        &state.pool,
        id,
        &ticket.status,
        &input.status,
        &lifecycle,
        &entry,
    )
    .await?
    .ok_or_else(|| AppError::conflict("Ticket status changed concurrently, retry"))?;

    tracing::info!(
        pqrs_id = id,
        from = %ticket.status,
        to = %updated.status,
        actor = auth.user_id,
        "PQRS status changed",
    );

    notify(
        &state.pool,
        updated.requester_id,
        NewNotification::about(
            KIND_PQRS,
            format!("Ticket {} updated", updated.ticket_number),
            format!("Your request is now {}", updated.status),
            "pqrs",
            updated.id,
        ),
    )
    .await;

    Ok(Json(DataResponse {
        data: PqrsTicketView::new(updated, now),
    }))
}

/// POST /api/v1/pqrs/{id}/rating
///
/// Only the requester rates, once the ticket is resolved or closed.
pub async fn rate_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RateRequest>,
) -> AppResult<Json<DataResponse<PqrsTicketView>>> {
    let ticket = PqrsRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("PqrsTicket", id))?;
    if ticket.requester_id != auth.user_id {
        return Err(AppError::forbidden("Only the requester can rate a ticket"));
    }
    validate_rating(&ticket.status, input.rating).map_err(AppError::invalid)?;

    let ticket = PqrsRepo::rate(&state.pool, id, input.rating)
        .await?
        .ok_or(AppError::not_found("PqrsTicket", id))?;
    tracing::info!(pqrs_id = id, rating = input.rating, "PQRS ticket rated");
    Ok(Json(DataResponse {
        data: PqrsTicketView::new(ticket, Utc::now()),
    }))
}

/// DELETE /api/v1/pqrs/{id}
pub async fn delete_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_PQRS, ACTION_DELETE)?;
    if PqrsRepo::delete(&state.pool, id).await? {
        tracing::info!(pqrs_id = id, "PQRS ticket deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("PqrsTicket", id))
    }
}
