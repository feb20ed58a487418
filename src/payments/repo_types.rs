use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::fx::Currency;
use crate::ledger::PaymentEntry;

#[derive(Debug, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub normalized_amount: Decimal,
    pub exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub payment_date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    /// As entered, in `currency`.
    pub amount: Decimal,
    pub currency: Currency,
    /// `amount` in the accounting currency; fixed at insert time.
    pub normalized_amount: Decimal,
    pub exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub payment_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = anyhow::Error;

    fn try_from(r: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            plan_id: r.plan_id,
            user_id: r.user_id,
            amount: r.amount,
            currency: r.currency.parse()?,
            normalized_amount: r.normalized_amount,
            exchange_rate: r.exchange_rate,
            notes: r.notes,
            payment_date: r.payment_date,
            created_at: r.created_at,
        })
    }
}

impl Payment {
    pub fn entry(&self) -> PaymentEntry {
        PaymentEntry {
            normalized_amount: self.normalized_amount,
            payment_date: self.payment_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Decimal,
    pub currency: Currency,
    pub normalized_amount: Decimal,
    pub exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub payment_date: OffsetDateTime,
}
