mod dto;
pub mod handlers;
pub mod prompt;
pub mod repo;
pub mod service;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
