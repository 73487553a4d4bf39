mod map;
mod position;
mod restaurants;

use axum::Router;
use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(position::router())
        .merge(restaurants::router())
        .merge(map::router())
}
