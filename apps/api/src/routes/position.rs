use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::constants::GEOLOCATION_UNSUPPORTED_STATUS;
use crate::error::AppResult;
use crate::map::MapView;
use crate::models::{PositionErrorRequest, PositionFixRequest, TrackingOptionsResponse};
use crate::state::AppState;
use crate::tracking::LocationEvent;
use crate::utils::Coordinate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tracking/options", get(tracking_options))
        .route("/position/fix", post(report_fix))
        .route("/position/error", post(report_error))
        .route("/position/unsupported", post(report_unsupported))
}

async fn tracking_options(State(state): State<AppState>) -> Json<TrackingOptionsResponse> {
    let tracking = &state.config.tracking;
    Json(TrackingOptionsResponse {
        enable_high_accuracy: tracking.enable_high_accuracy,
        timeout: tracking.timeout_ms,
        maximum_age: tracking.maximum_age_ms,
    })
}

async fn report_fix(
    State(state): State<AppState>,
    Json(request): Json<PositionFixRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    request.validate()?;

    let coordinate = Coordinate::new(request.latitude, request.longitude);
    state.push_location(LocationEvent::Fix(coordinate))?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}

async fn report_error(
    State(state): State<AppState>,
    Json(request): Json<PositionErrorRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    state.push_location(LocationEvent::Error(request.message))?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}

async fn report_unsupported(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.map.set_status(GEOLOCATION_UNSUPPORTED_STATUS);
    Json(json!({ "status": GEOLOCATION_UNSUPPORTED_STATUS }))
}
