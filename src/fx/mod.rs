use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod currency;
mod handlers;
pub mod services;

pub use currency::Currency;

pub fn router() -> Router<AppState> {
    handlers::fx_routes()
}
