use rust_decimal::Decimal;
use tracing::warn;

use super::advisor::{Advisor, Suggestion};
use super::dto::AnalyzeRequest;
use super::repo_types::{Profile, RiskTolerance};
use crate::error::{ApiError, ApiResult};

fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn profile_from(req: AnalyzeRequest) -> ApiResult<Profile> {
    let financial_goal = req.financial_goal.trim().to_string();
    if financial_goal.is_empty() {
        return Err(ApiError::InvalidInput("financial_goal must not be empty".into()));
    }
    if req.monthly_income.is_some_and(|v| v < Decimal::ZERO) {
        return Err(ApiError::InvalidInput("monthly_income must not be negative".into()));
    }
    let risk_tolerance = trimmed(req.risk_tolerance)
        .map(|r| r.parse::<RiskTolerance>())
        .transpose()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    Ok(Profile {
        financial_goal,
        monthly_income: req.monthly_income,
        risk_tolerance,
        preferred_payment_frequency: trimmed(req.preferred_payment_frequency),
        has_emergency_fund: req.has_emergency_fund,
        other_debts: trimmed(req.other_debts),
    })
}

/// Asks the advisor for a suggestion; any failure surfaces as `ExternalUnavailable`.
pub async fn suggest(advisor: &dyn Advisor, profile: &Profile) -> ApiResult<Suggestion> {
    advisor.suggest(profile).await.map_err(|e| {
        warn!(error = %e, "advisor call failed");
        ApiError::ExternalUnavailable("Suggestion service unavailable".into())
    })
}
