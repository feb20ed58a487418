use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{ComparePlansRequest, CreatePlanRequest, LedgerView, ScenariosResponse, UpdatePlanRequest},
    repo,
    repo_types::LoanPlan,
    services::{ledger_view, new_plan, plan_patch},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    fx::{services::current_rate, Currency},
    ledger::{
        build_ledger,
        compare::{compare_plans, ComparisonRow},
        filter_and_sort,
        scenarios::payoff_scenarios,
        PlanQuery,
    },
    payments::repo as payments_repo,
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/compare", post(compare))
        .route(
            "/plans/:id",
            get(get_plan).patch(update_plan).delete(delete_plan),
        )
        .route("/plans/:id/ledger", get(get_ledger))
        .route("/plans/:id/scenarios", get(get_scenarios))
}

async fn load_plan(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<LoanPlan> {
    repo::find(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound)
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PlanQuery>,
) -> ApiResult<Json<Vec<LoanPlan>>> {
    let plans = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(filter_and_sort(&plans, &query)))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let new = new_plan(payload)?;
    let plan = repo::create(&state.db, user_id, &new).await?;
    info!(plan_id = %plan.id, %user_id, total = %plan.total_amount, "plan created");

    let location = format!("/api/v1/plans/{}", plan.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(plan)))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanPlan>> {
    Ok(Json(load_plan(&state, user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlanRequest>,
) -> ApiResult<Json<LoanPlan>> {
    let patch = plan_patch(payload)?;
    let plan = repo::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(plan_id = %plan.id, "plan updated");
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    info!(plan_id = %id, "plan deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_ledger(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LedgerView>> {
    let plan = load_plan(&state, user_id, id).await?;
    let payments = payments_repo::list_for_plan(&state.db, user_id, id).await?;
    Ok(Json(ledger_view(plan, &payments, OffsetDateTime::now_utc())?))
}

#[instrument(skip(state))]
pub async fn get_scenarios(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScenariosResponse>> {
    let plan = load_plan(&state, user_id, id).await?;
    let payments = payments_repo::list_for_plan(&state.db, user_id, id).await?;
    let entries: Vec<_> = payments.iter().map(|p| p.entry()).collect();
    let remaining = build_ledger(plan.total_amount, &entries).summary.remaining;

    let gbp_rate = current_rate(state.rates.as_ref(), Currency::Gbp).await;
    let scenarios = payoff_scenarios(remaining, gbp_rate.rate, OffsetDateTime::now_utc())?;
    Ok(Json(ScenariosResponse {
        plan_id: plan.id,
        remaining,
        gbp_rate,
        scenarios,
    }))
}

#[instrument(skip(state, payload))]
pub async fn compare(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ComparePlansRequest>,
) -> ApiResult<Json<Vec<ComparisonRow>>> {
    if payload.plan_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let plans = repo::find_many(&state.db, user_id, &payload.plan_ids).await?;
    let payments = payments_repo::list_for_plans(&state.db, user_id, &payload.plan_ids).await?;
    let entries: Vec<_> = payments.iter().map(|p| (p.plan_id, p.entry())).collect();
    Ok(Json(compare_plans(&plans, &entries, &payload.plan_ids)))
}
