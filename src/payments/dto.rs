use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::Payment;
use crate::fx::Currency;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub payment_date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct CreatedPaymentResponse {
    #[serde(flatten)]
    pub payment: Payment,
    /// True when the rate provider was down and the fallback rate was used.
    pub rate_fallback: bool,
}
