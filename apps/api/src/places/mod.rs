mod geoapify;
mod overpass;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{PlacesConfig, PlacesProvider};
use crate::error::AppResult;
use crate::models::RestaurantResult;
use crate::utils::Coordinate;

pub use geoapify::{
    build_search_url, normalize_features, parse_feature, GeoapifyClient, RawDatasource, RawFeature,
    RawGeometry, RawProperties, RawTags,
};
pub use overpass::{build_overpass_query, normalize_elements, parse_element, OverpassClient, RawElement};

/// A source of restaurants around a point.
#[async_trait]
pub trait PlacesSource: Send + Sync {
    /// Queries the source, surfacing transport and decoding failures.
    async fn try_fetch_nearby(
        &self,
        origin: Coordinate,
        cuisine: Option<&str>,
    ) -> AppResult<Vec<RestaurantResult>>;

    /// Like [`PlacesSource::try_fetch_nearby`], but a failed query is logged
    /// and reported as an empty result set.
    async fn fetch_nearby(&self, origin: Coordinate, cuisine: Option<&str>) -> Vec<RestaurantResult> {
        match self.try_fetch_nearby(origin, cuisine).await {
            Ok(restaurants) => restaurants,
            Err(e) => {
                tracing::error!("Error fetching restaurants: {}", e);
                Vec::new()
            }
        }
    }
}

/// Returns the cuisine condition only when it carries something to filter on.
pub fn cuisine_condition(cuisine: Option<&str>) -> Option<&str> {
    cuisine.filter(|c| !c.is_empty())
}

/// Builds the client for the configured provider.
pub fn places_source(config: PlacesConfig) -> AppResult<Arc<dyn PlacesSource>> {
    Ok(match config.provider {
        PlacesProvider::Geoapify => Arc::new(GeoapifyClient::new(config)?),
        PlacesProvider::Overpass => Arc::new(OverpassClient::new(config)?),
    })
}

/// Upstream text, or `fallback` when it is absent or empty.
pub(crate) fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
