use rust_decimal::Decimal;
use time::OffsetDateTime;

use super::dto::{CreatePlanRequest, LedgerView, UpdatePlanRequest};
use super::repo_types::{LoanPlan, NewPlan, PlanPatch};
use crate::error::{ApiError, ApiResult};
use crate::fx::services::{check_money, round_money};
use crate::fx::Currency;
use crate::ledger::{
    build_ledger,
    chart::{payment_history, progress_slices, Milestone},
    project_payoff, PaymentEntry,
};
use crate::payments::repo_types::Payment;

fn clean_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("name must not be empty".into()));
    }
    Ok(name.to_string())
}

const INTEREST_LIMIT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

fn check_total(total: Decimal) -> ApiResult<Decimal> {
    check_money("total_amount", total)
}

fn check_target_months(months: Option<i32>) -> ApiResult<Option<i32>> {
    match months {
        Some(m) if m <= 0 => Err(ApiError::InvalidInput(
            "target_months must be a positive number".into(),
        )),
        other => Ok(other),
    }
}

/// Percent, stored as `NUMERIC(5,2)`.
fn check_interest(rate: Decimal) -> ApiResult<Decimal> {
    if rate < Decimal::ZERO {
        return Err(ApiError::InvalidInput("interest_rate must not be negative".into()));
    }
    let rate = round_money(rate);
    if rate >= INTEREST_LIMIT {
        return Err(ApiError::InvalidInput("interest_rate must be below 1000".into()));
    }
    Ok(rate)
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn new_plan(req: CreatePlanRequest) -> ApiResult<NewPlan> {
    Ok(NewPlan {
        name: clean_name(&req.name)?,
        description: blank_to_none(req.description),
        total_amount: check_total(req.total_amount)?,
        currency: req.currency.unwrap_or(Currency::Usd),
        target_months: check_target_months(req.target_months)?,
        loan_type: blank_to_none(req.loan_type),
        interest_rate: check_interest(req.interest_rate.unwrap_or(Decimal::ZERO))?,
    })
}

pub fn plan_patch(req: UpdatePlanRequest) -> ApiResult<PlanPatch> {
    Ok(PlanPatch {
        name: req.name.as_deref().map(clean_name).transpose()?,
        description: blank_to_none(req.description),
        total_amount: req.total_amount.map(check_total).transpose()?,
        target_months: check_target_months(req.target_months)?,
        loan_type: blank_to_none(req.loan_type),
        interest_rate: req.interest_rate.map(check_interest).transpose()?,
        is_active: req.is_active,
    })
}

/// Assembles ledger, projection and chart series for one plan.
/// `payments` must already be scoped to `plan`.
pub fn ledger_view(plan: LoanPlan, payments: &[Payment], now: OffsetDateTime) -> ApiResult<LedgerView> {
    let entries: Vec<PaymentEntry> = payments.iter().map(Payment::entry).collect();
    let mut ledger = build_ledger(plan.total_amount, &entries);
    let projection = project_payoff(&mut ledger, plan.target_months(), now)?;

    let bars: Vec<(PaymentEntry, Currency)> = payments
        .iter()
        .map(|p| (p.entry(), p.currency))
        .collect();
    let progress = progress_slices(&ledger.summary);
    let milestone = Milestone::for_progress(ledger.summary.progress_percent).map(Into::into);

    Ok(LedgerView {
        plan,
        history: payment_history(&bars),
        progress,
        milestone,
        projection,
        ledger,
    })
}
