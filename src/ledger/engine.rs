use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// What the engine needs from a payment: its normalised value and when it was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentEntry {
    pub normalized_amount: Decimal,
    pub payment_date: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Start,
    Payment,
    Projected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerPoint {
    pub kind: PointKind,
    /// `None` only for the synthetic start point.
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// Amount added by this point; zero for start and projected points.
    pub amount: Decimal,
    pub cumulative_paid: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total_amount: Decimal,
    /// Unclamped; may exceed `total_amount` on over-payment.
    pub total_paid: Decimal,
    pub remaining: Decimal,
    pub progress_percent: Decimal,
    pub payment_count: usize,
    pub average_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub points: Vec<LedgerPoint>,
    pub summary: LedgerSummary,
}

fn clamp_balance(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

/// Builds the running-balance series for `total_amount` from payments in any order.
///
/// Payments are ordered by `payment_date`; equal dates keep their input order.
pub fn build_ledger(total_amount: Decimal, payments: &[PaymentEntry]) -> Ledger {
    let mut ordered: Vec<&PaymentEntry> = payments.iter().collect();
    ordered.sort_by_key(|p| p.payment_date);

    let mut points = Vec::with_capacity(ordered.len() + 1);
    points.push(LedgerPoint {
        kind: PointKind::Start,
        date: None,
        amount: Decimal::ZERO,
        cumulative_paid: Decimal::ZERO,
        balance: total_amount,
    });

    let mut paid = Decimal::ZERO;
    for p in &ordered {
        paid += p.normalized_amount;
        points.push(LedgerPoint {
            kind: PointKind::Payment,
            date: Some(p.payment_date),
            amount: p.normalized_amount,
            cumulative_paid: paid,
            balance: clamp_balance(total_amount, paid),
        });
    }

    Ledger {
        points,
        summary: summarize(total_amount, paid, ordered.len()),
    }
}

pub fn summarize(total_amount: Decimal, total_paid: Decimal, payment_count: usize) -> LedgerSummary {
    let progress_percent = if total_amount.is_zero() {
        Decimal::ZERO
    } else {
        total_paid / total_amount * Decimal::ONE_HUNDRED
    };
    let average_payment = if payment_count == 0 {
        Decimal::ZERO
    } else {
        total_paid / Decimal::from(payment_count)
    };
    LedgerSummary {
        total_amount,
        total_paid,
        remaining: clamp_balance(total_amount, total_paid),
        progress_percent,
        payment_count,
        average_payment,
    }
}

impl Ledger {
    pub fn last_point(&self) -> &LedgerPoint {
        // build_ledger always pushes the start point
        &self.points[self.points.len() - 1]
    }

    /// Date of the earliest real payment, if any.
    pub fn first_payment_date(&self) -> Option<OffsetDateTime> {
        self.points
            .iter()
            .find(|p| p.kind == PointKind::Payment)
            .and_then(|p| p.date)
    }
}
