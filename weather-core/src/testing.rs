//! Fake providers and stores shared by the unit tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::RwLock;

use crate::{
    error::ProviderError,
    model::{Coordinate, ForecastPayload, GeocodeMatch, ReverseGeocodePayload},
    provider::{ForecastProvider, Geocoder},
    search_log::{SearchLogEntry, SearchLogError, SearchLogStore},
};

pub fn sample_forecast() -> Value {
    json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "current_units": { "temperature_2m": "°C", "weather_code": "wmo code" },
        "current": { "time": "2024-01-15T12:00", "temperature_2m": 5.5, "weather_code": 3 },
        "daily_units": { "temperature_2m_max": "°C", "temperature_2m_min": "°C" },
        "daily": {
            "time": ["2024-01-15", "2024-01-16", "2024-01-17"],
            "weather_code": [3, 61, 2],
            "temperature_2m_max": [8.0, 6.0, 10.0],
            "temperature_2m_min": [2.0, 1.0, 3.0],
            "sunrise": ["2024-01-15T07:15", "2024-01-16T07:14", "2024-01-17T07:13"],
            "sunset": ["2024-01-15T16:30", "2024-01-16T16:32", "2024-01-17T16:34"]
        }
    })
}

pub fn sample_reverse() -> Value {
    json!({
        "display_name": "Mitte, Berlin, Germany",
        "address": { "city": "Berlin", "country": "Germany" }
    })
}

#[derive(Debug)]
pub struct FakeForecast {
    payload: Option<Value>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeForecast {
    pub fn returning(payload: Value) -> Self {
        Self { payload: Some(payload), delay: None, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { payload: None, delay: None, calls: AtomicUsize::new(0) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastProvider for FakeForecast {
    async fn forecast(&self, _: &Coordinate, _: u8) -> Result<ForecastPayload, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.payload {
            Some(payload) => serde_json::from_value(payload.clone())
                .map_err(|e| ProviderError::Decode(e.to_string())),
            None => Err(ProviderError::Status { status: 503, body: "unavailable".into() }),
        }
    }
}

#[derive(Debug)]
pub struct FakeGeocoder {
    matches: Vec<GeocodeMatch>,
    reverse: Option<Value>,
    delay: Option<Duration>,
    pub searches: AtomicUsize,
    pub reverses: AtomicUsize,
}

impl FakeGeocoder {
    pub fn returning(reverse: Value) -> Self {
        Self {
            matches: Vec::new(),
            reverse: Some(reverse),
            delay: None,
            searches: AtomicUsize::new(0),
            reverses: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self { reverse: None, ..Self::returning(Value::Null) }
    }

    pub fn with_match(mut self, lat: &str, lon: &str) -> Self {
        self.matches.push(GeocodeMatch { lat: lat.into(), lon: lon.into(), display_name: None });
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn reverse_count(&self) -> usize {
        self.reverses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, _: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.clone())
    }

    async fn reverse(&self, _: &Coordinate) -> Result<ReverseGeocodePayload, ProviderError> {
        self.reverses.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reverse {
            Some(value) => Ok(ReverseGeocodePayload::from_value(value.clone())),
            None => Err(ProviderError::Transport("connection refused".into())),
        }
    }
}

/// A store whose every write fails.
#[derive(Debug, Default)]
pub struct BrokenStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl SearchLogStore for BrokenStore {
    async fn append(&self, _: &SearchLogEntry) -> Result<(), SearchLogError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SearchLogError::Rejected("disk full".into()))
    }
}

/// Keeps every appended entry in memory.
#[derive(Debug, Default)]
pub struct InMemorySearchLog {
    entries: RwLock<Vec<SearchLogEntry>>,
}

impl InMemorySearchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<SearchLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SearchLogStore for InMemorySearchLog {
    async fn append(&self, entry: &SearchLogEntry) -> Result<(), SearchLogError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}
