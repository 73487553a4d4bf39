use once_cell::sync::Lazy;
use std::path::PathBuf;

pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("NEARBY_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"))
});

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| DATA_DIR.join("config.yaml"));

pub static STATIC_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("NEARBY_STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("../web"))
});

pub const API_KEY_ENV: &str = "NEARBY_GEOAPIFY_API_KEY";

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://api.geoapify.com/v2/places";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_PLACES_CATEGORIES: &str = "catering.restaurant";
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 5000;
pub const DEFAULT_RESULT_LIMIT: u32 = 20;

// Hyderabad
pub const DEFAULT_MAP_LATITUDE: f64 = 17.3850;
pub const DEFAULT_MAP_LONGITUDE: f64 = 78.4867;
pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const FIRST_FIX_ZOOM: u8 = 15;

pub const DEFAULT_FIX_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_FIX_MAXIMUM_AGE_MS: u64 = 0;

pub const UNKNOWN_RESTAURANT_NAME: &str = "Unknown Restaurant";
pub const UNKNOWN_ADDRESS: &str = "No address";
pub const UNKNOWN_CUISINE: &str = "N/A";

pub const WAITING_FOR_LOCATION_NOTICE: &str = "Please wait for your location to load!";
pub const GEOLOCATION_UNSUPPORTED_STATUS: &str = "Geolocation not supported!";
pub const INITIAL_STATUS: &str = "Waiting for location...";
