use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    advisor::Suggestion, dto::AnalyzeRequest, repo, repo_types::UserPreferences,
    services::{profile_from, suggest},
};
use crate::{
    auth::AuthUser,
    error::ApiResult,
    state::AppState,
};

pub fn onboarding_routes() -> Router<AppState> {
    Router::new()
        .route("/onboarding/analyze", post(analyze))
        .route("/onboarding/preferences", get(get_preferences))
}

#[instrument(skip(state, payload))]
pub async fn analyze(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult<Json<Suggestion>> {
    let profile = profile_from(payload)?;
    repo::upsert(&state.db, user_id, &profile).await?;
    info!(%user_id, "preferences saved");

    Ok(Json(suggest(state.advisor.as_ref(), &profile).await?))
}

#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Option<UserPreferences>>> {
    Ok(Json(repo::find(&state.db, user_id).await?))
}
