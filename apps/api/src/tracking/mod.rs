mod subscription;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::constants::WAITING_FOR_LOCATION_NOTICE;
use crate::map::MapView;
use crate::places::{cuisine_condition, PlacesSource};
use crate::utils::Coordinate;

pub use subscription::Subscription;

/// One item of the device's continuous location feed.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Fix(Coordinate),
    Error(String),
}

#[derive(Debug, Clone, Copy)]
pub struct UserPosition {
    pub coordinate: Coordinate,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No fix has arrived yet; the notice was shown and nothing was queried.
    NoPosition,
    Applied {
        count: usize,
        cuisine: Option<String>,
    },
}

impl fmt::Display for FilterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOutcome::NoPosition => write!(f, "no position"),
            FilterOutcome::Applied { count, cuisine } => match cuisine {
                Some(c) => write!(f, "{} results for '{}'", count, c),
                None => write!(f, "{} results", count),
            },
        }
    }
}

/// Drives places queries from location fixes and filter requests, and
/// pushes the outcome onto the map.
///
/// In-flight queries are never cancelled. When several are outstanding,
/// whichever resolves last owns the marker set.
#[derive(Clone)]
pub struct Tracker {
    places: Arc<dyn PlacesSource>,
    map: Arc<dyn MapView>,
    position: Arc<RwLock<Option<UserPosition>>>,
    fix_zoom: u8,
}

impl Tracker {
    pub fn new(places: Arc<dyn PlacesSource>, map: Arc<dyn MapView>, fix_zoom: u8) -> Self {
        Self {
            places,
            map,
            position: Arc::new(RwLock::new(None)),
            fix_zoom,
        }
    }

    pub fn position(&self) -> Option<UserPosition> {
        *self.position.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns a task feeding every event of `events` into the tracker until
    /// the stream ends or the returned subscription is cancelled.
    pub fn watch<S>(&self, events: S) -> Subscription
    where
        S: Stream<Item = LocationEvent> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tracker = self.clone();

        let handle = tokio::spawn(async move {
            let mut events = Box::pin(events);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => {
                        tracing::info!("Location watch unsubscribed");
                        break;
                    }
                    next = events.next() => match next {
                        Some(event) => tracker.dispatch(event),
                        None => {
                            tracing::info!("Location feed closed");
                            break;
                        }
                    },
                }
            }
        });

        Subscription::new(token, handle)
    }

    fn dispatch(&self, event: LocationEvent) {
        match event {
            LocationEvent::Fix(coordinate) if !coordinate.is_valid() => {
                tracing::warn!(
                    "Ignoring out-of-range fix {}, {}",
                    coordinate.latitude,
                    coordinate.longitude
                );
            }
            LocationEvent::Fix(coordinate) => drop(self.handle_fix(coordinate)),
            LocationEvent::Error(message) => self.handle_error(&message),
        }
    }

    /// Records the fix, moves the user marker and starts a places query for
    /// the new position without waiting for it.
    pub fn handle_fix(&self, coordinate: Coordinate) -> JoinHandle<usize> {
        let first_fix = {
            let mut position = self.position.write().unwrap_or_else(PoisonError::into_inner);
            let first = position.is_none();
            *position = Some(UserPosition {
                coordinate,
                updated_at: Utc::now(),
            });
            first
        };

        self.map.set_status(&format!(
            "Location: {:.4}, {:.4}",
            coordinate.latitude, coordinate.longitude
        ));
        self.map.set_user_marker(coordinate);
        if first_fix {
            tracing::info!(
                "First fix at {:.4}, {:.4}",
                coordinate.latitude,
                coordinate.longitude
            );
            self.map.recenter(coordinate, self.fix_zoom);
        }

        let tracker = self.clone();
        tokio::spawn(async move { tracker.refresh(coordinate, None).await })
    }

    pub fn handle_error(&self, message: &str) {
        tracing::warn!("Location error: {}", message);
        self.map.set_status(&format!("Error: {}", message));
    }

    /// Queries around `origin` and replaces the restaurant markers with the
    /// outcome. Returns how many markers are now shown.
    pub async fn refresh(&self, origin: Coordinate, cuisine: Option<&str>) -> usize {
        let restaurants = self.places.fetch_nearby(origin, cuisine).await;
        let count = restaurants.len();
        self.map.replace_restaurant_markers(restaurants);
        count
    }

    /// Re-queries from the last known position with a cuisine condition.
    /// Surrounding whitespace is ignored and a blank input means no filter.
    pub async fn filter(&self, cuisine_input: &str) -> FilterOutcome {
        let Some(position) = self.position() else {
            self.map.notify(WAITING_FOR_LOCATION_NOTICE);
            return FilterOutcome::NoPosition;
        };

        let cuisine = cuisine_condition(Some(cuisine_input.trim())).map(str::to_string);
        let count = self.refresh(position.coordinate, cuisine.as_deref()).await;

        let outcome = FilterOutcome::Applied { count, cuisine };
        tracing::info!("Filter applied: {}", outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::map::MapState;
    use crate::test_utils::{restaurant, wait_until, ScriptedPlaces};
    use futures::channel::mpsc;
    use std::time::Duration;

    fn tracker_with(places: Arc<ScriptedPlaces>) -> (Tracker, Arc<MapState>) {
        let map = Arc::new(MapState::new(&MapConfig::default()));
        let tracker = Tracker::new(places, map.clone(), 15);
        (tracker, map)
    }

    #[tokio::test]
    async fn test_filter_before_fix_shows_notice_without_querying() {
        let places = Arc::new(ScriptedPlaces::new());
        let (tracker, map) = tracker_with(places.clone());

        let outcome = tracker.filter("italian").await;

        assert_eq!(outcome, FilterOutcome::NoPosition);
        assert_eq!(
            map.snapshot().notice.as_deref(),
            Some("Please wait for your location to load!")
        );
        assert_eq!(places.call_count(), 0);
    }

    #[tokio::test]
    async fn test_first_fix_recenters_and_later_fixes_only_move_marker() {
        let places = Arc::new(ScriptedPlaces::new());
        let (tracker, map) = tracker_with(places.clone());

        let first = Coordinate::new(17.4000, 78.4800);
        tracker.handle_fix(first).await.unwrap();

        let snapshot = map.snapshot();
        assert_eq!(snapshot.center, first);
        assert_eq!(snapshot.zoom, 15);
        assert_eq!(snapshot.user_marker, Some(first));
        assert_eq!(snapshot.status, "Location: 17.4000, 78.4800");

        let second = Coordinate::new(17.4100, 78.4900);
        tracker.handle_fix(second).await.unwrap();

        let snapshot = map.snapshot();
        assert_eq!(snapshot.center, first);
        assert_eq!(snapshot.user_marker, Some(second));
        assert_eq!(tracker.position().unwrap().coordinate, second);
        assert_eq!(places.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fix_queries_without_cuisine_and_shows_results() {
        let places = Arc::new(ScriptedPlaces::new());
        places.push_response(Duration::ZERO, vec![restaurant("Bawarchi"), restaurant("Chutneys")]);
        let (tracker, map) = tracker_with(places.clone());

        let count = tracker
            .handle_fix(Coordinate::new(17.3850, 78.4867))
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(map.snapshot().restaurants.len(), 2);
        assert_eq!(
            places.calls(),
            vec![(Coordinate::new(17.3850, 78.4867), None)]
        );
    }

    #[tokio::test]
    async fn test_filter_uses_last_position_and_trims_input() {
        let places = Arc::new(ScriptedPlaces::new());
        let (tracker, _map) = tracker_with(places.clone());
        let here = Coordinate::new(17.4400, 78.3800);
        tracker.handle_fix(here).await.unwrap();

        places.push_response(Duration::ZERO, vec![restaurant("Olive Bistro")]);
        let outcome = tracker.filter("  italian \n").await;

        assert_eq!(
            outcome,
            FilterOutcome::Applied {
                count: 1,
                cuisine: Some("italian".to_string())
            }
        );

        let blank = tracker.filter("   ").await;
        assert_eq!(
            blank,
            FilterOutcome::Applied {
                count: 0,
                cuisine: None
            }
        );

        assert_eq!(
            places.calls(),
            vec![
                (here, None),
                (here, Some("italian".to_string())),
                (here, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_query_clears_markers() {
        let places = Arc::new(ScriptedPlaces::new());
        places.push_response(Duration::ZERO, vec![restaurant("A")]);
        let (tracker, map) = tracker_with(places.clone());

        tracker.handle_fix(Coordinate::new(1.0, 1.0)).await.unwrap();
        assert_eq!(map.snapshot().restaurants.len(), 1);

        places.push_failure();
        let outcome = tracker.filter("").await;

        assert_eq!(outcome, FilterOutcome::Applied { count: 0, cuisine: None });
        assert!(map.snapshot().restaurants.is_empty());
    }

    #[tokio::test]
    async fn test_slower_older_query_overwrites_newer_results() {
        let places = Arc::new(ScriptedPlaces::new());
        places.push_response(Duration::from_millis(200), vec![restaurant("Old")]);
        places.push_response(Duration::ZERO, vec![restaurant("New A"), restaurant("New B")]);
        let (tracker, map) = tracker_with(places.clone());

        let older = tracker.handle_fix(Coordinate::new(17.0, 78.0));
        let newer = tracker.handle_fix(Coordinate::new(17.1, 78.1));

        assert_eq!(newer.await.unwrap(), 2);
        assert_eq!(map.snapshot().restaurants.len(), 2);

        assert_eq!(older.await.unwrap(), 1);
        let snapshot = map.snapshot();
        assert_eq!(snapshot.restaurants.len(), 1);
        assert_eq!(snapshot.restaurants[0].restaurant.name, "Old");
        assert_eq!(snapshot.user_marker, Some(Coordinate::new(17.1, 78.1)));
    }

    #[tokio::test]
    async fn test_watch_forwards_errors_and_keeps_listening() {
        let places = Arc::new(ScriptedPlaces::new());
        let (tracker, map) = tracker_with(places.clone());
        let (tx, rx) = mpsc::unbounded();
        let subscription = tracker.watch(rx);

        tx.unbounded_send(LocationEvent::Error("User denied Geolocation".to_string()))
            .unwrap();
        let reached = wait_until(|| map.snapshot().status == "Error: User denied Geolocation").await;
        assert!(reached);

        tx.unbounded_send(LocationEvent::Fix(Coordinate::new(17.385, 78.4867)))
            .unwrap();
        let reached = wait_until(|| places.call_count() == 1).await;
        assert!(reached);
        assert!(subscription.is_active());

        drop(tx);
        subscription.closed().await;
    }

    #[tokio::test]
    async fn test_watch_ignores_out_of_range_fixes() {
        let places = Arc::new(ScriptedPlaces::new());
        let (tracker, map) = tracker_with(places.clone());
        let (tx, rx) = mpsc::unbounded();
        let _subscription = tracker.watch(rx);

        tx.unbounded_send(LocationEvent::Fix(Coordinate::new(123.0, 78.0)))
            .unwrap();
        tx.unbounded_send(LocationEvent::Error("Position unavailable".to_string()))
            .unwrap();
        let reached = wait_until(|| map.snapshot().status == "Error: Position unavailable").await;
        assert!(reached);

        assert!(tracker.position().is_none());
        assert!(map.snapshot().user_marker.is_none());
        assert_eq!(places.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_consuming_events() {
        let places = Arc::new(ScriptedPlaces::new());
        let (tracker, _map) = tracker_with(places.clone());
        let (tx, rx) = mpsc::unbounded();
        let subscription = tracker.watch(rx);

        subscription.unsubscribe();
        let reached = wait_until(|| !subscription.is_active()).await;
        assert!(reached);

        // The receiver went away with the task.
        assert!(tx
            .unbounded_send(LocationEvent::Fix(Coordinate::new(0.0, 0.0)))
            .is_err());
        assert!(tracker.position().is_none());
        assert_eq!(places.call_count(), 0);
    }
}
