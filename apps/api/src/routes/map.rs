use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::models::MapSnapshot;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/map", get(get_map))
        .route("/map/notice/dismiss", post(dismiss_notice))
}

async fn get_map(State(state): State<AppState>) -> Json<MapSnapshot> {
    Json(state.map.snapshot())
}

async fn dismiss_notice(State(state): State<AppState>) -> Json<MapSnapshot> {
    state.map.dismiss_notice();
    Json(state.map.snapshot())
}
