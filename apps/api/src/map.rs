use std::sync::{PoisonError, RwLock};

use crate::config::MapConfig;
use crate::constants::INITIAL_STATUS;
use crate::models::{MapSnapshot, RestaurantMarker, RestaurantResult};
use crate::utils::Coordinate;

/// Sink for everything the widget shows: viewport, markers, status line and
/// blocking notices.
pub trait MapView: Send + Sync {
    fn set_user_marker(&self, coordinate: Coordinate);

    fn recenter(&self, coordinate: Coordinate, zoom: u8);

    /// Drops every restaurant marker currently shown, then adds one per result.
    fn replace_restaurant_markers(&self, restaurants: Vec<RestaurantResult>);

    fn set_status(&self, text: &str);

    fn notify(&self, text: &str);
}

/// In-memory map published to the page as a [`MapSnapshot`].
pub struct MapState {
    inner: RwLock<MapSnapshot>,
}

impl MapState {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            inner: RwLock::new(MapSnapshot {
                center: Coordinate::new(config.default_latitude, config.default_longitude),
                zoom: config.default_zoom,
                user_marker: None,
                restaurants: Vec::new(),
                status: INITIAL_STATUS.to_string(),
                notice: None,
                generation: 0,
            }),
        }
    }

    pub fn snapshot(&self) -> MapSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dismiss_notice(&self) {
        self.update(|map| map.notice = None);
    }

    fn update(&self, apply: impl FnOnce(&mut MapSnapshot)) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut *map);
    }
}

impl MapView for MapState {
    fn set_user_marker(&self, coordinate: Coordinate) {
        self.update(|map| map.user_marker = Some(coordinate));
    }

    fn recenter(&self, coordinate: Coordinate, zoom: u8) {
        self.update(|map| {
            map.center = coordinate;
            map.zoom = zoom;
        });
    }

    fn replace_restaurant_markers(&self, restaurants: Vec<RestaurantResult>) {
        let markers: Vec<RestaurantMarker> =
            restaurants.into_iter().map(RestaurantMarker::from).collect();
        self.update(|map| {
            map.restaurants = markers;
            map.generation += 1;
        });
    }

    fn set_status(&self, text: &str) {
        self.update(|map| map.status = text.to_string());
    }

    fn notify(&self, text: &str) {
        self.update(|map| map.notice = Some(text.to_string()));
    }
}
