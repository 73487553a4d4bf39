use crate::constants::{
    API_KEY_ENV, DEFAULT_FIX_MAXIMUM_AGE_MS, DEFAULT_FIX_TIMEOUT_MS, DEFAULT_MAP_LATITUDE,
    DEFAULT_MAP_LONGITUDE, DEFAULT_MAP_ZOOM, DEFAULT_OVERPASS_URL, DEFAULT_PLACES_BASE_URL,
    DEFAULT_PLACES_CATEGORIES, DEFAULT_RESULT_LIMIT, DEFAULT_SEARCH_RADIUS_METERS, FIRST_FIX_ZOOM,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which upstream answers restaurant queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacesProvider {
    /// Geoapify Places v2, needs `api_key`.
    #[default]
    Geoapify,
    /// An OpenStreetMap Overpass interpreter, keyless.
    Overpass,
}

/// Upstream places-search settings. `categories` and `api_key` only apply to
/// Geoapify; `overpass_url` only to Overpass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default)]
    pub provider: PlacesProvider,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_categories")]
    pub categories: String,
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
}

fn default_base_url() -> String {
    DEFAULT_PLACES_BASE_URL.to_string()
}

fn default_categories() -> String {
    DEFAULT_PLACES_CATEGORIES.to_string()
}

fn default_radius_meters() -> u32 {
    DEFAULT_SEARCH_RADIUS_METERS
}

fn default_limit() -> u32 {
    DEFAULT_RESULT_LIMIT
}

fn default_user_agent() -> String {
    "NearbyEats/0.1 (self-hosted)".to_string()
}

fn default_overpass_url() -> String {
    DEFAULT_OVERPASS_URL.to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            provider: PlacesProvider::default(),
            base_url: default_base_url(),
            api_key: String::new(),
            categories: default_categories(),
            radius_meters: default_radius_meters(),
            limit: default_limit(),
            user_agent: default_user_agent(),
            overpass_url: default_overpass_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "default_fix_zoom")]
    pub fix_zoom: u8,
}

fn default_latitude() -> f64 {
    DEFAULT_MAP_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_MAP_LONGITUDE
}

fn default_zoom() -> u8 {
    DEFAULT_MAP_ZOOM
}

fn default_fix_zoom() -> u8 {
    FIRST_FIX_ZOOM
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
            default_zoom: default_zoom(),
            fix_zoom: default_fix_zoom(),
        }
    }
}

/// Options handed to the browser's continuous location subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_high_accuracy")]
    pub enable_high_accuracy: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_maximum_age_ms")]
    pub maximum_age_ms: u64,
}

fn default_high_accuracy() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_FIX_TIMEOUT_MS
}

fn default_maximum_age_ms() -> u64 {
    DEFAULT_FIX_MAXIMUM_AGE_MS
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enable_high_accuracy: default_high_accuracy(),
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: default_maximum_age_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

pub fn load_config(config_path: &Path) -> Config {
    let mut config = read_config_file(config_path);
    apply_env_overrides(&mut config);
    config
}

fn read_config_file(config_path: &Path) -> Config {
    if !config_path.exists() {
        return Config::default();
    }

    match fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config {:?}: {}", config_path, e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.places.api_key = key.trim().to_string();
        }
    }
}

pub fn save_default_config(config_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).map_err(|e| std::io::Error::other(e.to_string()))?;
    fs::write(config_path, yaml)
}
