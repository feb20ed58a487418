use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::fx::Currency;
use crate::ledger::PlanListing;

#[derive(Debug, FromRow)]
pub struct LoanPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub currency: String,
    pub target_months: Option<i32>,
    pub loan_type: Option<String>,
    pub interest_rate: Decimal,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A debt being tracked. `interest_rate` and `is_active` are stored but never
/// feed into any calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub target_months: Option<i32>,
    pub loan_type: Option<String>,
    pub interest_rate: Decimal,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<LoanPlanRow> for LoanPlan {
    type Error = anyhow::Error;

    fn try_from(r: LoanPlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            description: r.description,
            total_amount: r.total_amount,
            currency: r.currency.parse()?,
            target_months: r.target_months,
            loan_type: r.loan_type,
            interest_rate: r.interest_rate,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl LoanPlan {
    /// Non-positive stored values map to `Some(0)`, which the projection rejects.
    pub fn target_months(&self) -> Option<u32> {
        self.target_months.map(|m| u32::try_from(m).unwrap_or(0))
    }
}

impl PlanListing for LoanPlan {
    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn currency(&self) -> Currency {
        self.currency
    }
    fn total_amount(&self) -> Decimal {
        self.total_amount
    }
    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// Validated input for an insert.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub target_months: Option<i32>,
    pub loan_type: Option<String>,
    pub interest_rate: Decimal,
}

/// Validated partial update; `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_amount: Option<Decimal>,
    pub target_months: Option<i32>,
    pub loan_type: Option<String>,
    pub interest_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}
