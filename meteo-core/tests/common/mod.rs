//! Fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use meteo_core::{
    ClientSettings, Coordinates, GeolocationError, JsonFetcher, Location, PositionProvider,
    Renderer, WeatherClient, WeatherError, WeatherView, clock::ManualClock,
    geolocation::PositionOptions,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::{fmt, sync::Arc, time::Duration};
use url::Url;

pub const GEOCODING_HOST: &str = "geocoding.test";
pub const FORECAST_HOST: &str = "forecast.test";

pub fn settings() -> ClientSettings {
    ClientSettings {
        geocoding_url: format!("https://{GEOCODING_HOST}/v1/search"),
        forecast_url: format!("https://{FORECAST_HOST}/v1/forecast"),
        ..ClientSettings::default()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub fn param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
}

/// Seven places for any name except `NoSuchPlaceXYZ`. The first one is
/// named exactly like the query; names of different length land on
/// different coordinates.
pub fn places_json(name: &str) -> Value {
    if name == "NoSuchPlaceXYZ" {
        return json!({ "generationtime_ms": 0.4 });
    }

    let results: Vec<Value> = (0..7)
        .map(|i| {
            let place = if i == 0 { name.to_string() } else { format!("{name} {i}") };
            json!({
                "id": 100 + i,
                "name": place,
                "latitude": 50.0 + f64::from(i),
                "longitude": name.len() as f64 - f64::from(i),
                "country": "Testland",
                "admin1": "Region"
            })
        })
        .collect();
    json!({ "results": results })
}

pub fn forecast_json() -> Value {
    let times: Vec<String> =
        (0..48).map(|h| format!("2024-01-{:02}T{:02}:00", 1 + h / 24, h % 24)).collect();
    let dates: Vec<String> = (1..=7).map(|d| format!("2024-01-{d:02}")).collect();

    json!({
        "latitude": 51.5,
        "longitude": -0.12,
        "timezone": "Europe/London",
        "elevation": 11.0,
        "current": {
            "time": "2024-01-01T12:00",
            "temperature_2m": 8.0,
            "relative_humidity_2m": 80,
            "apparent_temperature": 5.5,
            "is_day": 1,
            "precipitation": 0.2,
            "weather_code": 61,
            "cloud_cover": 90,
            "surface_pressure": 1005.0,
            "wind_speed_10m": 20.0,
            "wind_direction_10m": 225
        },
        "hourly": {
            "time": times,
            "temperature_2m": vec![7.0; 48],
            "precipitation_probability": vec![40; 48],
            "weather_code": vec![61; 48],
            "visibility": vec![12_000.0; 48]
        },
        "daily": {
            "time": dates,
            "weather_code": vec![61; 7],
            "temperature_2m_max": vec![9.0; 7],
            "temperature_2m_min": vec![3.0; 7]
        }
    })
}

/// Answers like Open-Meteo would for [`settings`].
pub fn open_meteo(url: &Url) -> Result<Value, WeatherError> {
    match url.host_str() {
        Some(GEOCODING_HOST) => match param(url, "name") {
            Some(name) => Ok(places_json(&name)),
            None => Ok(json!({
                "results": [
                    { "name": "Paris", "latitude": 48.85, "longitude": 2.35, "country": "France" }
                ]
            })),
        },
        Some(FORECAST_HOST) => Ok(forecast_json()),
        _ => Err(WeatherError::transport(format!("unexpected url {url}"))),
    }
}

type Route = dyn Fn(&Url) -> Result<Value, WeatherError> + Send + Sync;

/// Routes every request through a closure and records the URLs along
/// with the timeout each was given.
pub struct FakeFetcher {
    route: Box<Route>,
    calls: Mutex<Vec<(Url, Duration)>>,
}

impl FakeFetcher {
    pub fn new(
        route: impl Fn(&Url) -> Result<Value, WeatherError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self { route: Box::new(route), calls: Mutex::new(Vec::new()) })
    }

    pub fn open_meteo() -> Arc<Self> {
        Self::new(open_meteo)
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn calls_to(&self, host: &str) -> usize {
        self.calls.lock().iter().filter(|(url, _)| url.host_str() == Some(host)).count()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.calls.lock().iter().map(|(_, timeout)| *timeout).collect()
    }

    /// Geocoding requests by name, leaving out the health probe.
    pub fn searches(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|(url, _)| url)
            .filter(|url| url.host_str() == Some(GEOCODING_HOST))
            .filter(|url| param(url, "count").as_deref() != Some("1"))
            .filter_map(|url| param(url, "name"))
            .collect()
    }
}

impl fmt::Debug for FakeFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeFetcher").field("calls", &self.calls.lock().len()).finish()
    }
}

#[async_trait]
impl JsonFetcher for FakeFetcher {
    async fn get_json(&self, url: &Url, timeout: Duration) -> Result<Value, WeatherError> {
        self.calls.lock().push((url.clone(), timeout));
        (self.route)(url)
    }
}

#[derive(Debug, Clone)]
pub struct FakePosition {
    pub result: Result<Coordinates, GeolocationError>,
    pub delay: Duration,
}

impl FakePosition {
    pub fn at(latitude: f64, longitude: f64) -> Arc<Self> {
        Arc::new(Self { result: Ok(Coordinates::new(latitude, longitude)), delay: Duration::ZERO })
    }

    pub fn failing(err: GeolocationError) -> Arc<Self> {
        Arc::new(Self { result: Err(err), delay: Duration::ZERO })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self { result: Ok(Coordinates::new(0.0, 0.0)), delay })
    }
}

#[async_trait]
impl PositionProvider for FakePosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result
    }
}

pub struct Harness {
    pub client: Arc<WeatherClient>,
    pub fetcher: Arc<FakeFetcher>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(fetcher: Arc<FakeFetcher>, position: Arc<FakePosition>) -> Harness {
    harness_with(settings(), fetcher, position)
}

pub fn harness_with(
    settings: ClientSettings,
    fetcher: Arc<FakeFetcher>,
    position: Arc<FakePosition>,
) -> Harness {
    let clock = Arc::new(ManualClock::new(start_time()));
    let client = WeatherClient::new(settings, fetcher.clone(), position, clock.clone());
    Harness { client: Arc::new(client), fetcher, clock }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Loading,
    Error(String),
    Weather(Box<WeatherView>),
    Suggestions(Vec<String>),
    HideSuggestions,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<Event>>,
}

impl RecordingRenderer {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|event| matches(event)).count()
    }

    pub fn last_weather(&self) -> Option<WeatherView> {
        self.events.lock().iter().rev().find_map(|event| match event {
            Event::Weather(view) => Some((**view).clone()),
            _ => None,
        })
    }

    pub fn last(&self) -> Option<Event> {
        self.events.lock().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn show_loading(&self) {
        self.events.lock().push(Event::Loading);
    }

    fn show_error(&self, message: &str) {
        self.events.lock().push(Event::Error(message.to_string()));
    }

    fn show_weather(&self, view: &WeatherView) {
        self.events.lock().push(Event::Weather(Box::new(view.clone())));
    }

    fn show_suggestions(&self, places: &[Location]) {
        let names = places.iter().map(|place| place.name.clone()).collect();
        self.events.lock().push(Event::Suggestions(names));
    }

    fn hide_suggestions(&self) {
        self.events.lock().push(Event::HideSuggestions);
    }
}
