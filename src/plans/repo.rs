use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{LoanPlan, LoanPlanRow, NewPlan, PlanPatch};

const PLAN_COLUMNS: &str = "id, user_id, name, description, total_amount, currency, \
     target_months, loan_type, interest_rate, is_active, created_at, updated_at";

fn into_plans(rows: Vec<LoanPlanRow>) -> anyhow::Result<Vec<LoanPlan>> {
    rows.into_iter().map(LoanPlan::try_from).collect()
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<LoanPlan>> {
    let rows = sqlx::query_as::<_, LoanPlanRow>(&format!(
        "SELECT {PLAN_COLUMNS} FROM loan_plans WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list plans")?;
    into_plans(rows)
}

/// Owner-scoped lookup; a plan owned by someone else is `None`.
pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<LoanPlan>> {
    let row = sqlx::query_as::<_, LoanPlanRow>(&format!(
        "SELECT {PLAN_COLUMNS} FROM loan_plans WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find plan")?;
    row.map(LoanPlan::try_from).transpose()
}

pub async fn find_many(db: &PgPool, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<LoanPlan>> {
    let rows = sqlx::query_as::<_, LoanPlanRow>(&format!(
        "SELECT {PLAN_COLUMNS} FROM loan_plans WHERE user_id = $1 AND id = ANY($2)"
    ))
    .bind(user_id)
    .bind(ids)
    .fetch_all(db)
    .await
    .context("find plans by ids")?;
    into_plans(rows)
}

pub async fn create(db: &PgPool, user_id: Uuid, new: &NewPlan) -> anyhow::Result<LoanPlan> {
    let row = sqlx::query_as::<_, LoanPlanRow>(&format!(
        r#"
        INSERT INTO loan_plans
            (user_id, name, description, total_amount, currency, target_months, loan_type, interest_rate)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.total_amount)
    .bind(new.currency.code())
    .bind(new.target_months)
    .bind(&new.loan_type)
    .bind(new.interest_rate)
    .fetch_one(db)
    .await
    .context("insert plan")?;
    row.try_into()
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    patch: &PlanPatch,
) -> anyhow::Result<Option<LoanPlan>> {
    let row = sqlx::query_as::<_, LoanPlanRow>(&format!(
        r#"
        UPDATE loan_plans SET
            name          = COALESCE($3, name),
            description   = COALESCE($4, description),
            total_amount  = COALESCE($5, total_amount),
            target_months = COALESCE($6, target_months),
            loan_type     = COALESCE($7, loan_type),
            interest_rate = COALESCE($8, interest_rate),
            is_active     = COALESCE($9, is_active),
            updated_at    = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(patch.total_amount)
    .bind(patch.target_months)
    .bind(&patch.loan_type)
    .bind(patch.interest_rate)
    .bind(patch.is_active)
    .fetch_optional(db)
    .await
    .context("update plan")?;
    row.map(LoanPlan::try_from).transpose()
}

/// Payments go with the plan through `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM loan_plans WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete plan")?;
    Ok(res.rows_affected() > 0)
}
