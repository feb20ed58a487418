use axum::{extract::State, routing::get, Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use super::{currency::Currency, services::current_rate};
use crate::{auth::services::AuthUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub base: Currency,
    pub quote: Currency,
    pub rate: Decimal,
    pub fallback: bool,
}

pub fn fx_routes() -> Router<AppState> {
    Router::new().route("/fx/rate", get(get_rate))
}

#[instrument(skip(state))]
pub async fn get_rate(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Json<RateResponse> {
    let quote = current_rate(state.rates.as_ref(), Currency::Gbp).await;
    Json(RateResponse {
        base: Currency::Gbp,
        quote: Currency::Usd,
        rate: quote.rate,
        fallback: quote.fallback,
    })
}
