use crate::state::AppState;
use axum::Router;

mod dto;
mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

pub fn router() -> Router<AppState> {
    handlers::payment_routes()
}
