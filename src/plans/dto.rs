use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::LoanPlan;
use crate::fx::{services::RateQuote, Currency};
use crate::ledger::{
    chart::{HistoryBar, Milestone, ProgressSlice},
    scenarios::PayoffScenario,
    Ledger, Projection,
};

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub target_months: Option<i32>,
    #[serde(default)]
    pub loan_type: Option<String>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_amount: Option<Decimal>,
    pub target_months: Option<i32>,
    pub loan_type: Option<String>,
    pub interest_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ComparePlansRequest {
    pub plan_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MilestoneView {
    pub tier: Milestone,
    pub title: &'static str,
}

impl From<Milestone> for MilestoneView {
    fn from(tier: Milestone) -> Self {
        Self {
            tier,
            title: tier.title(),
        }
    }
}

/// Everything the plan detail screen draws.
#[derive(Debug, Serialize)]
pub struct LedgerView {
    pub plan: LoanPlan,
    pub ledger: Ledger,
    pub projection: Option<Projection>,
    pub history: Vec<HistoryBar>,
    pub progress: [ProgressSlice; 2],
    pub milestone: Option<MilestoneView>,
}

#[derive(Debug, Serialize)]
pub struct ScenariosResponse {
    pub plan_id: Uuid,
    pub remaining: Decimal,
    pub gbp_rate: RateQuote,
    pub scenarios: Vec<PayoffScenario>,
}
