//! Handlers for the `/payments` resource.
//!
//! Callers without `payments:update` only see their own apartment's
//! payments and statement.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use conjunto_core::payment::{
    compute_totals, format_receipt_number, late_fee, months_overdue, state_machine,
    total_with_fee, validate_period, STATUS_CANCELLED, STATUS_OVERDUE, STATUS_PAID,
    VALID_CONCEPTS, VALID_METHODS,
};
use conjunto_core::roles::{
    ACTION_CREATE, ACTION_DELETE, ACTION_READ, ACTION_UPDATE, MODULE_PAYMENTS,
};
use conjunto_core::types::{Cop, DbId};
use conjunto_db::models::payment::{
    AccountStatement, CreatePayment, Payment, PaymentFilter, PaymentItem, SettlePayment,
};
use conjunto_db::repositories::{ApartmentRepo, PaymentRepo, UserRepo};
use conjunto_db::DbPool;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::check_one_of;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /payments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub apartment_id: DbId,
    pub user_id: Option<DbId>,
    pub concept: String,
    pub period: String,
    #[validate(length(min = 1, max = 50))]
    pub items: Vec<PaymentItem>,
    #[serde(default)]
    pub discount: Cop,
    pub due_date: NaiveDate,
}

/// Request body for `POST /payments/{id}/pay`.
#[derive(Debug, Deserialize, Validate)]
pub struct PayRequest {
    pub method: String,
    #[validate(length(min = 1, max = 100))]
    pub reference: Option<String>,
}

fn is_staff(auth: &AuthUser) -> bool {
    auth.can(MODULE_PAYMENTS, ACTION_UPDATE)
}

/// The caller's apartment, if they are linked to one.
async fn own_apartment(pool: &DbPool, auth: &AuthUser) -> AppResult<Option<DbId>> {
    Ok(UserRepo::find_by_id(pool, auth.user_id)
        .await?
        .and_then(|u| u.apartment_id))
}

async fn load_payment(pool: &DbPool, id: DbId) -> AppResult<Payment> {
    PaymentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Payment", id))
}

/// POST /api/v1/payments
pub async fn create_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Payment>>)> {
    auth.require(MODULE_PAYMENTS, ACTION_CREATE)?;
    input.validate()?;
    check_one_of("concept", &input.concept, VALID_CONCEPTS)?;
    validate_period(&input.period).map_err(AppError::invalid)?;
    if input.items.iter().any(|i| i.description.trim().is_empty()) {
        return Err(AppError::invalid("Item descriptions must not be empty"));
    }

    let amounts: Vec<Cop> = input.items.iter().map(|i| i.amount).collect();
    let totals = compute_totals(&amounts, input.discount, 0).map_err(AppError::invalid)?;

    if ApartmentRepo::find_by_id(&state.pool, input.apartment_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Apartment", input.apartment_id));
    }

    let today = Utc::now().date_naive();
    let sequence = PaymentRepo::next_sequence(&state.pool).await?;

    let create = CreatePayment {
        receipt_number: format_receipt_number(today.year(), today.month(), sequence),
        apartment_id: input.apartment_id,
        user_id: input.user_id,
        concept: input.concept,
        period: input.period,
        items: input.items,
        subtotal: totals.subtotal,
        discount: totals.discount,
        late_fee: totals.late_fee,
        total: totals.total,
        due_date: input.due_date,
    };

    let payment = PaymentRepo::create(&state.pool, &create).await?;
    tracing::info!(
        payment_id = payment.id,
        receipt_number = %payment.receipt_number,
        total = payment.total,
        "Payment created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}

/// GET /api/v1/payments
pub async fn list_payments(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(mut filter): Query<PaymentFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Payment>>>> {
    auth.require(MODULE_PAYMENTS, ACTION_READ)?;
    if !is_staff(&auth) {
        match own_apartment(&state.pool, &auth).await? {
            Some(apartment_id) => filter.apartment_id = Some(apartment_id),
            None => return Ok(Json(DataResponse { data: Vec::new() })),
        }
    }

    let payments = PaymentRepo::list(&state.pool, &filter, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// GET /api/v1/payments/{id}
pub async fn get_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Payment>>> {
    auth.require(MODULE_PAYMENTS, ACTION_READ)?;
    let payment = load_payment(&state.pool, id).await?;
    if !is_staff(&auth) && own_apartment(&state.pool, &auth).await? != Some(payment.apartment_id)
    {
        return Err(AppError::not_found("Payment", id));
    }
    Ok(Json(DataResponse { data: payment }))
}

/// POST /api/v1/payments/{id}/pay
///
/// Paying late charges the late fee accrued up to today, never less than a
/// fee already recorded when the payment went overdue.
pub async fn pay_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PayRequest>,
) -> AppResult<Json<DataResponse<Payment>>> {
    auth.require(MODULE_PAYMENTS, ACTION_UPDATE)?;
    input.validate()?;
    check_one_of("method", &input.method, VALID_METHODS)?;

    let payment = load_payment(&state.pool, id).await?;
    state_machine::validate_transition(&payment.status, STATUS_PAID).map_err(AppError::conflict)?;

    let now = Utc::now();
    let accrued = late_fee(
        payment.fee_base(),
        months_overdue(payment.due_date, now.date_naive()),
    )
    .map_err(AppError::conflict)?;
    let fee = payment.late_fee.max(accrued);
    let total = total_with_fee(payment.fee_base(), fee).map_err(AppError::conflict)?;

    let settle = SettlePayment {
        method: input.method,
        reference: input.reference,
        late_fee: fee,
        total,
        paid_at: now,
    };
    let paid = PaymentRepo::settle(&state.pool, id, &payment.status, &settle)
        .await?
        .ok_or_else(|| AppError::conflict("Payment status changed concurrently, retry"))?;

    tracing::info!(
        payment_id = id,
        method = %settle.method,
        late_fee = fee,
        total = paid.total,
        "Payment settled",
    );
    Ok(Json(DataResponse { data: paid }))
}

/// POST /api/v1/payments/{id}/overdue
pub async fn mark_overdue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Payment>>> {
    auth.require(MODULE_PAYMENTS, ACTION_UPDATE)?;

    let payment = load_payment(&state.pool, id).await?;
    state_machine::validate_transition(&payment.status, STATUS_OVERDUE)
        .map_err(AppError::conflict)?;

    let months = months_overdue(payment.due_date, Utc::now().date_naive());
    if months == 0 {
        return Err(AppError::conflict(format!(
            "Payment {} is not due until {}",
            payment.receipt_number, payment.due_date
        )));
    }
    let fee = late_fee(payment.fee_base(), months).map_err(AppError::conflict)?;
    let total = total_with_fee(payment.fee_base(), fee).map_err(AppError::conflict)?;

    let overdue = PaymentRepo::mark_overdue(&state.pool, id, fee, total)
        .await?
        .ok_or_else(|| AppError::conflict("Payment status changed concurrently, retry"))?;
    tracing::info!(payment_id = id, months, late_fee = fee, "Payment marked overdue");
    Ok(Json(DataResponse { data: overdue }))
}

/// POST /api/v1/payments/{id}/cancel
pub async fn cancel_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Payment>>> {
    auth.require(MODULE_PAYMENTS, ACTION_UPDATE)?;

    let payment = load_payment(&state.pool, id).await?;
    state_machine::validate_transition(&payment.status, STATUS_CANCELLED)
        .map_err(AppError::conflict)?;

    let cancelled = PaymentRepo::cancel(&state.pool, id, &payment.status)
        .await?
        .ok_or_else(|| AppError::conflict("Payment status changed concurrently, retry"))?;
    tracing::info!(payment_id = id, "Payment cancelled");
    Ok(Json(DataResponse { data: cancelled }))
}

/// GET /api/v1/payments/statement/{apartment_id}
pub async fn apartment_statement(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(apartment_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccountStatement>>> {
    auth.require(MODULE_PAYMENTS, ACTION_READ)?;
    if !is_staff(&auth) && own_apartment(&state.pool, &auth).await? != Some(apartment_id) {
        return Err(AppError::forbidden(
            "You can only view your own apartment's statement",
        ));
    }
    if ApartmentRepo::find_by_id(&state.pool, apartment_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Apartment", apartment_id));
    }

    let statement = PaymentRepo::statement(&state.pool, apartment_id).await?;
    Ok(Json(DataResponse { data: statement }))
}

/// DELETE /api/v1/payments/{id}
pub async fn delete_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(MODULE_PAYMENTS, ACTION_DELETE)?;
    if PaymentRepo::delete(&state.pool, id).await? {
        tracing::info!(payment_id = id, "Payment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Payment", id))
    }
}
