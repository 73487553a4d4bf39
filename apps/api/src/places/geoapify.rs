use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::PlacesConfig;
use crate::constants::{UNKNOWN_ADDRESS, UNKNOWN_CUISINE, UNKNOWN_RESTAURANT_NAME};
use crate::error::{AppError, AppResult};
use crate::models::RestaurantResult;
use crate::places::{cuisine_condition, text_or, PlacesSource};
use crate::utils::{distance_km, Coordinate};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Value>,
}

/// A single GeoJSON feature as returned by the Places API.
#[derive(Debug, Default, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub geometry: Option<RawGeometry>,
    #[serde(default)]
    pub properties: RawProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub datasource: Option<RawDatasource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDatasource {
    #[serde(default)]
    pub raw: Option<RawTags>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTags {
    #[serde(default)]
    pub cuisine: Option<String>,
}

/// Turns a raw feature into a result, filling in the documented defaults.
///
/// Returns `None` when the feature has no usable `[lon, lat]` pair.
pub fn parse_feature(raw: &RawFeature, origin: Coordinate) -> Option<RestaurantResult> {
    let coordinates = &raw.geometry.as_ref()?.coordinates;
    let (longitude, latitude) = match coordinates.as_slice() {
        [lon, lat, ..] => (*lon, *lat),
        _ => return None,
    };
    let coordinate = Coordinate::new(latitude, longitude);

    let props = &raw.properties;
    let cuisine = props
        .datasource
        .as_ref()
        .and_then(|d| d.raw.as_ref())
        .and_then(|r| r.cuisine.as_deref());

    Some(RestaurantResult {
        name: text_or(props.name.as_deref(), UNKNOWN_RESTAURANT_NAME),
        coordinate,
        address: text_or(props.address_line2.as_deref(), UNKNOWN_ADDRESS),
        cuisine: text_or(cuisine, UNKNOWN_CUISINE),
        distance_km: distance_km(origin, coordinate),
    })
}

/// Normalizes features in upstream order. Unusable features are skipped.
pub fn normalize_features(features: Vec<Value>, origin: Coordinate) -> Vec<RestaurantResult> {
    features
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let parsed = serde_json::from_value::<RawFeature>(value)
                .ok()
                .and_then(|raw| parse_feature(&raw, origin));
            if parsed.is_none() {
                tracing::warn!("Skipping place feature #{} without usable geometry", index);
            }
            parsed
        })
        .collect()
}

pub fn build_search_url(config: &PlacesConfig, origin: Coordinate, cuisine: Option<&str>) -> String {
    let mut params: Vec<(&str, String)> = vec![
        ("categories", config.categories.clone()),
        (
            "filter",
            format!(
                "circle:{},{},{}",
                origin.longitude, origin.latitude, config.radius_meters
            ),
        ),
        ("limit", config.limit.to_string()),
        ("apiKey", config.api_key.clone()),
    ];

    if let Some(condition) = cuisine_condition(cuisine) {
        params.push(("conditions", condition.to_string()));
    }

    // Vec<(&str, String)> always serializes.
    let query = serde_urlencoded::to_string(&params).unwrap_or_default();
    format!("{}?{}", config.base_url, query)
}

pub struct GeoapifyClient {
    client: reqwest::Client,
    config: PlacesConfig,
}

impl GeoapifyClient {
    pub fn new(config: PlacesConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;

        if config.api_key.is_empty() {
            tracing::warn!("No places API key configured; upstream queries will be rejected");
        }

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PlacesSource for GeoapifyClient {
    async fn try_fetch_nearby(
        &self,
        origin: Coordinate,
        cuisine: Option<&str>,
    ) -> AppResult<Vec<RestaurantResult>> {
        let url = build_search_url(&self.config, origin, cuisine);
        tracing::debug!(
            "Querying places around {:.4}, {:.4} (cuisine: {:?})",
            origin.latitude,
            origin.longitude,
            cuisine_condition(cuisine)
        );

        // The URL carries the API key; keep it out of any error that gets logged.
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::from(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "places search returned {}",
                status
            )));
        }

        let collection: FeatureCollection = response
            .json()
            .await
            .map_err(|e| AppError::from(e.without_url()))?;
        Ok(normalize_features(collection.features, origin))
    }
}
