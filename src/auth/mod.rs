mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use jwt::AuthUser;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
