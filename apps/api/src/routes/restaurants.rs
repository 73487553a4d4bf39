use axum::{extract::State, routing::post, Json, Router};
use validator::Validate;

use crate::constants::WAITING_FOR_LOCATION_NOTICE;
use crate::error::{AppError, AppResult};
use crate::models::{
    FilterRequest, FilterResponse, NearbyRestaurantsRequest, NearbyRestaurantsResponse,
};
use crate::places::cuisine_condition;
use crate::state::AppState;
use crate::tracking::FilterOutcome;
use crate::utils::Coordinate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants/nearby", post(nearby_restaurants))
        .route("/restaurants/filter", post(filter_restaurants))
}

async fn nearby_restaurants(
    State(state): State<AppState>,
    Json(request): Json<NearbyRestaurantsRequest>,
) -> AppResult<Json<NearbyRestaurantsResponse>> {
    request.validate()?;

    let origin = Coordinate::new(request.latitude, request.longitude);
    let cuisine = cuisine_condition(request.cuisine.as_deref().map(str::trim));
    let restaurants = state.places.fetch_nearby(origin, cuisine).await;
    let total_count = restaurants.len();

    Ok(Json(NearbyRestaurantsResponse {
        restaurants,
        total_count,
    }))
}

async fn filter_restaurants(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> AppResult<Json<FilterResponse>> {
    match state.tracker.filter(&request.cuisine).await {
        FilterOutcome::NoPosition => Err(AppError::Precondition(
            WAITING_FOR_LOCATION_NOTICE.to_string(),
        )),
        FilterOutcome::Applied { count, cuisine } => Ok(Json(FilterResponse { count, cuisine })),
    }
}
