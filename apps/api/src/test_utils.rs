#![cfg(test)]

use crate::app::create_app;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::RestaurantResult;
use crate::places::PlacesSource;
use crate::state::AppState;
use crate::utils::Coordinate;
use async_trait::async_trait;
use axum::{extract::RawQuery, http::StatusCode, routing::any, Json, Router};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fixture restaurant near the default map center.
pub fn restaurant(name: &str) -> RestaurantResult {
    RestaurantResult {
        name: name.to_string(),
        coordinate: Coordinate::new(17.4012, 78.4778),
        address: "Hyderabad".to_string(),
        cuisine: "indian".to_string(),
        distance_km: 2.0,
    }
}

enum Scripted {
    Results(Duration, Vec<RestaurantResult>),
    Failure,
}

/// Places source answering from a queue of canned responses, recording every
/// call. Once the queue is empty it answers with no results.
#[derive(Default)]
pub struct ScriptedPlaces {
    calls: Mutex<Vec<(Coordinate, Option<String>)>>,
    responses: Mutex<VecDeque<Scripted>>,
}

impl ScriptedPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, delay: Duration, restaurants: Vec<RestaurantResult>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Results(delay, restaurants));
    }

    pub fn push_failure(&self) {
        self.responses.lock().unwrap().push_back(Scripted::Failure);
    }

    pub fn calls(&self) -> Vec<(Coordinate, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PlacesSource for ScriptedPlaces {
    async fn try_fetch_nearby(
        &self,
        origin: Coordinate,
        cuisine: Option<&str>,
    ) -> AppResult<Vec<RestaurantResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((origin, cuisine.map(str::to_string)));
        let next = self.responses.lock().unwrap().pop_front();

        match next {
            Some(Scripted::Results(delay, restaurants)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(restaurants)
            }
            Some(Scripted::Failure) => Err(AppError::Upstream("scripted failure".to_string())),
            None => Ok(Vec::new()),
        }
    }
}

/// A local HTTP server standing in for the upstream places API. Answers any
/// method on `/places` with the same canned response.
pub struct PlacesStub {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<String>>,
}

impl PlacesStub {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> String {
        self.last_body.lock().unwrap().clone()
    }
}

pub async fn spawn_places_stub(status: StatusCode, body: Value) -> PlacesStub {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_query = Arc::new(Mutex::new(None));
    let last_body = Arc::new(Mutex::new(String::new()));

    let handler_hits = hits.clone();
    let handler_query = last_query.clone();
    let handler_body = last_body.clone();
    let app = Router::new().route(
        "/places",
        any(move |RawQuery(query): RawQuery, request_body: String| {
            let hits = handler_hits.clone();
            let last_query = handler_query.clone();
            let last_body = handler_body.clone();
            let body = body.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                *last_query.lock().unwrap() = query;
                *last_body.lock().unwrap() = request_body;
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Stub listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    PlacesStub {
        base_url: format!("http://{}/places", addr),
        hits,
        last_query,
        last_body,
    }
}

/// A base URL on a port nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind scratch listener");
    let addr = listener.local_addr().expect("Scratch listener has no address");
    drop(listener);
    format!("http://{}/places", addr)
}

/// Polls `check` for up to two seconds.
pub async fn wait_until(check: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Create a test app backed by scripted places.
pub fn create_test_app(places: Arc<ScriptedPlaces>) -> (Router, AppState) {
    let state = AppState::new(Arc::new(Config::default()), places);
    let app = create_app(state.clone(), None);
    (app, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_places_replays_queue_in_order() {
        let places = ScriptedPlaces::new();
        places.push_response(Duration::ZERO, vec![restaurant("A")]);
        places.push_failure();

        let origin = Coordinate::new(0.0, 0.0);
        assert_eq!(places.fetch_nearby(origin, Some("thai")).await.len(), 1);
        assert!(places.try_fetch_nearby(origin, None).await.is_err());
        assert!(places.fetch_nearby(origin, None).await.is_empty());
        assert_eq!(places.call_count(), 3);
        assert_eq!(places.calls()[0].1.as_deref(), Some("thai"));
    }

    #[tokio::test]
    async fn test_create_test_app() {
        let (_app, state) = create_test_app(Arc::new(ScriptedPlaces::new()));
        assert!(state.tracker.position().is_none());
    }
}
