//! Payment rules: totals, late fees, billing periods and receipt numbers.

use chrono::{Datelike, NaiveDate};

use crate::types::Cop;
use crate::validation::check_transition;

pub const CONCEPT_ADMINISTRATION: &str = "administration";
pub const CONCEPT_EXTRAORDINARY: &str = "extraordinary";
pub const CONCEPT_PARKING: &str = "parking";
pub const CONCEPT_RESERVATION: &str = "reservation";
pub const CONCEPT_FINE: &str = "fine";
pub const CONCEPT_OTHER: &str = "other";

pub const VALID_CONCEPTS: &[&str] = &[
    CONCEPT_ADMINISTRATION,
    CONCEPT_EXTRAORDINARY,
    CONCEPT_PARKING,
    CONCEPT_RESERVATION,
    CONCEPT_FINE,
    CONCEPT_OTHER,
];

pub const METHOD_CASH: &str = "cash";
pub const METHOD_BANK_TRANSFER: &str = "bank_transfer";
pub const METHOD_CARD: &str = "card";
/// Colombian online bank debit.
pub const METHOD_PSE: &str = "pse";

pub const VALID_METHODS: &[&str] = &[METHOD_CASH, METHOD_BANK_TRANSFER, METHOD_CARD, METHOD_PSE];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_OVERDUE: &str = "overdue";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_PAID, STATUS_OVERDUE, STATUS_CANCELLED];

/// Statuses that still count towards an apartment's outstanding balance.
pub const OUTSTANDING_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_OVERDUE];

/// Monthly late-fee rate in basis points (150 = 1.5 %).
pub const LATE_FEE_MONTHLY_BPS: i64 = 150;

/// Largest subtotal a single payment may carry (one trillion pesos).
pub const MAX_SUBTOTAL: Cop = 1_000_000_000_000;

/// Derived monetary fields of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Cop,
    pub discount: Cop,
    pub late_fee: Cop,
    pub total: Cop,
}

/// Sum item amounts and apply discount and late fee.
///
/// Every amount must be positive, there must be at least one item, the
/// subtotal is capped at [`MAX_SUBTOTAL`] and the discount cannot exceed it.
pub fn compute_totals(amounts: &[Cop], discount: Cop, late_fee: Cop) -> Result<Totals, String> {
    if amounts.is_empty() {
        return Err("A payment needs at least one item".to_string());
    }
    let mut subtotal: Cop = 0;
    for &amount in amounts {
        if amount <= 0 {
            return Err(format!("Item amounts must be positive, got {amount}"));
        }
        subtotal = subtotal
            .checked_add(amount)
            .filter(|total| *total <= MAX_SUBTOTAL)
            .ok_or_else(|| format!("Payment subtotal cannot exceed {MAX_SUBTOTAL}"))?;
    }
    if discount < 0 || discount > subtotal {
        return Err(format!(
            "Discount must be between 0 and the subtotal ({subtotal}), got {discount}"
        ));
    }
    if late_fee < 0 {
        return Err(format!("Late fee cannot be negative, got {late_fee}"));
    }
    Ok(Totals {
        subtotal,
        discount,
        late_fee,
        total: total_with_fee(subtotal - discount, late_fee)?,
    })
}

/// `base + fee`, or an error if the sum does not fit.
pub fn total_with_fee(base: Cop, fee: Cop) -> Result<Cop, String> {
    base.checked_add(fee)
        .ok_or_else(|| format!("Payment total overflows ({base} + {fee})"))
}

/// Started months between `due` and `on`. Zero when `on` is not past `due`.
pub fn months_overdue(due: NaiveDate, on: NaiveDate) -> i64 {
    if on <= due {
        return 0;
    }
    let mut months = i64::from(on.year() - due.year()) * 12 + i64::from(on.month())
        - i64::from(due.month());
    if on.day() > due.day() {
        months += 1;
    }
    months.max(1)
}

/// Late fee on `base` for `months` started months, truncated to whole pesos.
pub fn late_fee(base: Cop, months: i64) -> Result<Cop, String> {
    if base <= 0 || months <= 0 {
        return Ok(0);
    }
    base.checked_mul(LATE_FEE_MONTHLY_BPS)
        .and_then(|v| v.checked_mul(months))
        .map(|v| v / 10_000)
        .ok_or_else(|| format!("Late fee on {base} for {months} months overflows"))
}

/// Validate a `YYYY-MM` billing period.
pub fn validate_period(period: &str) -> Result<(), String> {
    let valid = period.len() == 7
        && NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid period '{period}'. Expected YYYY-MM"))
    }
}

/// Format a receipt number such as `REC-202610-000123`.
pub fn format_receipt_number(year: i32, month: u32, sequence: i64) -> String {
    format!("REC-{year}{month:02}-{sequence:06}")
}

pub mod state_machine {
    use super::*;

    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            STATUS_PENDING => &[STATUS_PAID, STATUS_OVERDUE, STATUS_CANCELLED],
            STATUS_OVERDUE => &[STATUS_PAID, STATUS_CANCELLED],
            _ => &[],
        }
    }

    pub fn can_transition(from: &str, to: &str) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        check_transition("payment", valid_transitions(from), from, to)
    }
}
