use axum::Router;

use crate::state::AppState;

mod dto;
pub mod encoder;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::qr_routes()
}
