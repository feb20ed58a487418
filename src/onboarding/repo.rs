use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{PreferencesRow, Profile, UserPreferences};

const PREF_COLUMNS: &str = "user_id, financial_goal, monthly_income, risk_tolerance, \
     preferred_payment_frequency, has_emergency_fund, other_debts, created_at, updated_at";

pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserPreferences>> {
    let row = sqlx::query_as::<_, PreferencesRow>(&format!(
        "SELECT {PREF_COLUMNS} FROM user_preferences WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find preferences")?;
    row.map(UserPreferences::try_from).transpose()
}

pub async fn upsert(db: &PgPool, user_id: Uuid, profile: &Profile) -> anyhow::Result<UserPreferences> {
    let row = sqlx::query_as::<_, PreferencesRow>(&format!(
        r#"
        INSERT INTO user_preferences
            (user_id, financial_goal, monthly_income, risk_tolerance,
             preferred_payment_frequency, has_emergency_fund, other_debts)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            financial_goal              = EXCLUDED.financial_goal,
            monthly_income              = EXCLUDED.monthly_income,
            risk_tolerance              = EXCLUDED.risk_tolerance,
            preferred_payment_frequency = EXCLUDED.preferred_payment_frequency,
            has_emergency_fund          = EXCLUDED.has_emergency_fund,
            other_debts                 = EXCLUDED.other_debts,
            updated_at                  = now()
        RETURNING {PREF_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&profile.financial_goal)
    .bind(profile.monthly_income)
    .bind(profile.risk_tolerance.map(|r| r.as_str()))
    .bind(&profile.preferred_payment_frequency)
    .bind(profile.has_emergency_fund)
    .bind(&profile.other_debts)
    .fetch_one(db)
    .await
    .context("upsert preferences")?;
    row.try_into()
}
