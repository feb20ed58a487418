use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "medium" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            other => anyhow::bail!("unknown risk tolerance: {}", other),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct PreferencesRow {
    pub user_id: Uuid,
    pub financial_goal: Option<String>,
    pub monthly_income: Option<Decimal>,
    pub risk_tolerance: Option<String>,
    pub preferred_payment_frequency: Option<String>,
    pub has_emergency_fund: Option<bool>,
    pub other_debts: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One row per owner, overwritten on every analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPreferences {
    pub user_id: Uuid,
    pub financial_goal: Option<String>,
    pub monthly_income: Option<Decimal>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub preferred_payment_frequency: Option<String>,
    pub has_emergency_fund: Option<bool>,
    pub other_debts: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<PreferencesRow> for UserPreferences {
    type Error = anyhow::Error;

    fn try_from(r: PreferencesRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: r.user_id,
            financial_goal: r.financial_goal,
            monthly_income: r.monthly_income,
            risk_tolerance: r.risk_tolerance.as_deref().map(str::parse).transpose()?,
            preferred_payment_frequency: r.preferred_payment_frequency,
            has_emergency_fund: r.has_emergency_fund,
            other_debts: r.other_debts,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated answers from the onboarding form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub financial_goal: String,
    pub monthly_income: Option<Decimal>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub preferred_payment_frequency: Option<String>,
    pub has_emergency_fund: Option<bool>,
    pub other_debts: Option<String>,
}
