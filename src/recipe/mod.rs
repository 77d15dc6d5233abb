mod dto;
pub mod handlers;
pub mod model;
pub mod repo;
pub mod services;

use crate::state::AppState;
use axum::Router;

use model::RecordKind;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::record_routes(RecordKind::Tag))
        .merge(handlers::record_routes(RecordKind::Ingredient))
}
