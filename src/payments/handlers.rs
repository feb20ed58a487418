use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreatePaymentRequest, CreatedPaymentResponse},
    repo,
    repo_types::Payment,
    services::prepare_payment,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    plans,
    state::AppState,
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/plans/:id/payments", get(list_payments).post(create_payment))
        .route("/plans/:id/payments/:payment_id", delete(delete_payment))
}

async fn ensure_plan(state: &AppState, user_id: Uuid, plan_id: Uuid) -> ApiResult<()> {
    match plans::repo::find(&state.db, user_id, plan_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound),
    }
}

#[instrument(skip(state))]
pub async fn list_payments(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Payment>>> {
    ensure_plan(&state, user_id, plan_id).await?;
    let payments = repo::list_for_plan(&state.db, user_id, plan_id).await?;
    Ok(Json(payments))
}

#[instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_plan(&state, user_id, plan_id).await?;

    let (new, quote) =
        prepare_payment(state.rates.as_ref(), payload, OffsetDateTime::now_utc()).await?;
    let payment = repo::create(&state.db, user_id, plan_id, &new).await?;

    if quote.fallback {
        warn!(payment_id = %payment.id, "payment recorded with fallback rate");
    }
    info!(
        payment_id = %payment.id,
        %plan_id,
        amount = %payment.amount,
        currency = %payment.currency,
        normalized = %payment.normalized_amount,
        "payment recorded"
    );

    let location = format!("/api/v1/plans/{}/payments/{}", plan_id, payment.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedPaymentResponse {
            payment,
            rate_fallback: quote.fallback,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_payment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((plan_id, payment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, user_id, plan_id, payment_id).await? {
        return Err(ApiError::NotFound);
    }
    info!(%payment_id, %plan_id, "payment deleted");
    Ok(StatusCode::NO_CONTENT)
}
