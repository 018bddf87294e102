//! Payment model and DTOs.

use chrono::NaiveDate;
use conjunto_core::types::{Cop, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// One charge line of a payment, stored in the `items` JSONB array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub description: String,
    pub amount: Cop,
}

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub receipt_number: String,
    pub apartment_id: DbId,
    pub user_id: Option<DbId>,
    pub concept: String,
    /// Billing period, `YYYY-MM`.
    pub period: String,
    pub items: Json<Vec<PaymentItem>>,
    pub subtotal: Cop,
    pub discount: Cop,
    pub late_fee: Cop,
    pub total: Cop,
    pub method: Option<String>,
    pub status: String,
    pub due_date: NaiveDate,
    pub paid_at: Option<Timestamp>,
    pub reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// Amount the late fee is charged on.
    pub fn fee_base(&self) -> Cop {
        self.subtotal - self.discount
    }
}

/// Insert DTO. Receipt number and totals are derived by the caller.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub receipt_number: String,
    pub apartment_id: DbId,
    pub user_id: Option<DbId>,
    pub concept: String,
    pub period: String,
    pub items: Vec<PaymentItem>,
    pub subtotal: Cop,
    pub discount: Cop,
    pub late_fee: Cop,
    pub total: Cop,
    pub due_date: NaiveDate,
}

/// Settlement data written when a payment is marked paid.
#[derive(Debug, Clone)]
pub struct SettlePayment {
    pub method: String,
    pub reference: Option<String>,
    pub late_fee: Cop,
    pub total: Cop,
    pub paid_at: Timestamp,
}

/// Filters accepted by the payment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    pub apartment_id: Option<DbId>,
    pub status: Option<String>,
    pub period: Option<String>,
}

/// Balance summary of one apartment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountStatement {
    pub apartment_id: DbId,
    pub outstanding_count: i64,
    pub outstanding_total: Cop,
    pub overdue_count: i64,
    pub paid_total: Cop,
}
