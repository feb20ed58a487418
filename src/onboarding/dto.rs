use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub financial_goal: String,
    #[serde(default)]
    pub monthly_income: Option<Decimal>,
    #[serde(default)]
    pub risk_tolerance: Option<String>,
    #[serde(default)]
    pub preferred_payment_frequency: Option<String>,
    #[serde(default)]
    pub has_emergency_fund: Option<bool>,
    #[serde(default)]
    pub other_debts: Option<String>,
}
