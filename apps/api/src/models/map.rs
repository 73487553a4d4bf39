use serde::Serialize;

use crate::models::RestaurantResult;
use crate::utils::Coordinate;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantMarker {
    #[serde(flatten)]
    pub restaurant: RestaurantResult,
    pub popup: String,
}

impl From<RestaurantResult> for RestaurantMarker {
    fn from(restaurant: RestaurantResult) -> Self {
        let popup = restaurant.popup_html();
        Self { restaurant, popup }
    }
}

/// Everything the page needs to draw the map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub center: Coordinate,
    pub zoom: u8,
    pub user_marker: Option<Coordinate>,
    pub restaurants: Vec<RestaurantMarker>,
    pub status: String,
    pub notice: Option<String>,
    pub generation: u64,
}
