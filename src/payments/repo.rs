use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewPayment, Payment, PaymentRow};

const PAYMENT_COLUMNS: &str = "id, plan_id, user_id, amount, currency, normalized_amount, \
     exchange_rate, notes, payment_date, created_at";

fn into_payments(rows: Vec<PaymentRow>) -> anyhow::Result<Vec<Payment>> {
    rows.into_iter().map(Payment::try_from).collect()
}

/// Ascending by payment date, ties by insertion time.
pub async fn list_for_plan(db: &PgPool, user_id: Uuid, plan_id: Uuid) -> anyhow::Result<Vec<Payment>> {
    let rows = sqlx::query_as::<_, PaymentRow>(&format!(
        r#"
        SELECT {PAYMENT_COLUMNS}
        FROM payments
        WHERE plan_id = $1 AND user_id = $2
        ORDER BY payment_date ASC, created_at ASC
        "#
    ))
    .bind(plan_id)
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list payments")?;
    into_payments(rows)
}

pub async fn list_for_plans(
    db: &PgPool,
    user_id: Uuid,
    plan_ids: &[Uuid],
) -> anyhow::Result<Vec<Payment>> {
    let rows = sqlx::query_as::<_, PaymentRow>(&format!(
        r#"
        SELECT {PAYMENT_COLUMNS}
        FROM payments
        WHERE user_id = $1 AND plan_id = ANY($2)
        ORDER BY payment_date ASC, created_at ASC
        "#
    ))
    .bind(user_id)
    .bind(plan_ids)
    .fetch_all(db)
    .await
    .context("list payments for plans")?;
    into_payments(rows)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    new: &NewPayment,
) -> anyhow::Result<Payment> {
    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        r#"
        INSERT INTO payments
            (plan_id, user_id, amount, currency, normalized_amount, exchange_rate, notes, payment_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(plan_id)
    .bind(user_id)
    .bind(new.amount)
    .bind(new.currency.code())
    .bind(new.normalized_amount)
    .bind(new.exchange_rate)
    .bind(&new.notes)
    .bind(new.payment_date)
    .fetch_one(db)
    .await
    .context("insert payment")?;
    row.try_into()
}

/// Removes the payment only when it sits under `plan_id` and belongs to `user_id`.
pub async fn delete(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    payment_id: Uuid,
) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM payments WHERE id = $1 AND plan_id = $2 AND user_id = $3")
        .bind(payment_id)
        .bind(plan_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete payment")?;
    Ok(res.rows_affected() > 0)
}
