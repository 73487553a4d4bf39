use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::PlacesConfig;
use crate::constants::{UNKNOWN_ADDRESS, UNKNOWN_CUISINE, UNKNOWN_RESTAURANT_NAME};
use crate::error::{AppError, AppResult};
use crate::models::RestaurantResult;
use crate::places::{cuisine_condition, text_or, PlacesSource};
use crate::utils::{distance_km, Coordinate};

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Value>,
}

/// A node from an Overpass `out body` answer. OSM tag values are always text.
#[derive(Debug, Default, Deserialize)]
pub struct RawElement {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl RawElement {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// "12 Road No. 1, Hyderabad" out of the `addr:*` tags present.
    fn address(&self) -> Option<String> {
        let street = [self.tag("addr:housenumber"), self.tag("addr:street")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let parts: Vec<&str> = [Some(street.as_str()), self.tag("addr:city")]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Overpass QL for restaurant nodes within the configured radius.
///
/// A cuisine narrows the search with a case-insensitive match on the
/// `cuisine` tag.
pub fn build_overpass_query(config: &PlacesConfig, origin: Coordinate, cuisine: Option<&str>) -> String {
    let cuisine_filter = cuisine_condition(cuisine)
        .map(|c| format!("[\"cuisine\"~\"{}\",i]", quote(c)))
        .unwrap_or_default();

    format!(
        "[out:json];node[\"amenity\"=\"restaurant\"]{}(around:{},{},{});out body {};",
        cuisine_filter, config.radius_meters, origin.latitude, origin.longitude, config.limit
    )
}

/// Returns `None` for elements without a position (ways and relations
/// carry no `lat`/`lon` under `out body`).
pub fn parse_element(raw: &RawElement, origin: Coordinate) -> Option<RestaurantResult> {
    let coordinate = Coordinate::new(raw.lat?, raw.lon?);
    let address = raw.address();

    Some(RestaurantResult {
        name: text_or(raw.tag("name"), UNKNOWN_RESTAURANT_NAME),
        coordinate,
        address: text_or(address.as_deref(), UNKNOWN_ADDRESS),
        cuisine: text_or(raw.tag("cuisine"), UNKNOWN_CUISINE),
        distance_km: distance_km(origin, coordinate),
    })
}

pub fn normalize_elements(elements: Vec<Value>, origin: Coordinate) -> Vec<RestaurantResult> {
    elements
        .into_iter()
        .filter_map(|value| {
            let raw = serde_json::from_value::<RawElement>(value).ok()?;
            let parsed = parse_element(&raw, origin);
            if parsed.is_none() {
                tracing::warn!("Skipping OSM element {:?} without a position", raw.id);
            }
            parsed
        })
        .collect()
}

pub struct OverpassClient {
    client: reqwest::Client,
    config: PlacesConfig,
}

impl OverpassClient {
    pub fn new(config: PlacesConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PlacesSource for OverpassClient {
    async fn try_fetch_nearby(
        &self,
        origin: Coordinate,
        cuisine: Option<&str>,
    ) -> AppResult<Vec<RestaurantResult>> {
        let query = build_overpass_query(&self.config, origin, cuisine);
        tracing::debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(&self.config.overpass_url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "overpass interpreter returned {}",
                status
            )));
        }

        let body: OverpassResponse = response.json().await?;
        Ok(normalize_elements(body.elements, origin))
    }
}
