use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::Coordinate;

/// One nearby place, normalized from the upstream response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResult {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub address: String,
    pub cuisine: String,
    pub distance_km: f64,
}

impl RestaurantResult {
    pub fn popup_html(&self) -> String {
        format!(
            "<b>{}</b><br>Cuisine: {}<br>Address: {}<br>Distance: {:.2} km",
            self.name, self.cuisine, self.address, self.distance_km
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRestaurantsRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub cuisine: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRestaurantsResponse {
    pub restaurants: Vec<RestaurantResult>,
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub cuisine: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    pub count: usize,
    pub cuisine: Option<String>,
}
