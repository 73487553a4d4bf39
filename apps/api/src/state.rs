use futures::channel::mpsc::{self, UnboundedSender};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::map::MapState;
use crate::places::PlacesSource;
use crate::tracking::{LocationEvent, Subscription, Tracker};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub places: Arc<dyn PlacesSource>,
    pub map: Arc<MapState>,
    pub tracker: Tracker,
    pub subscription: Arc<Subscription>,
    events: UnboundedSender<LocationEvent>,
}

impl AppState {
    /// Builds the session state and starts watching the location feed.
    /// Must be called inside a tokio runtime.
    pub fn new(config: Arc<Config>, places: Arc<dyn PlacesSource>) -> Self {
        let map = Arc::new(MapState::new(&config.map));
        let tracker = Tracker::new(places.clone(), map.clone(), config.map.fix_zoom);

        let (events, feed) = mpsc::unbounded();
        let subscription = Arc::new(tracker.watch(feed));

        Self {
            config,
            places,
            map,
            tracker,
            subscription,
            events,
        }
    }

    pub fn push_location(&self, event: LocationEvent) -> AppResult<()> {
        self.events
            .unbounded_send(event)
            .map_err(|_| AppError::Internal("Location watch is not running".to_string()))
    }
}
