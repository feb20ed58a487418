use crate::state::AppState;
use axum::Router;

pub mod advisor;
mod dto;
mod handlers;
mod repo;
pub mod repo_types;
mod services;

pub fn router() -> Router<AppState> {
    handlers::onboarding_routes()
}
