//! The weather client: geocoding, position lookup and cached forecasts.

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

use crate::{
    cache::{WeatherCache, coordinate_key},
    clock::{Clock, SystemClock},
    config::Config,
    error::WeatherError,
    geolocation::{ConfiguredPosition, GeolocationError, PositionOptions, PositionProvider},
    http::{JsonFetcher, QueryParams, ReqwestFetcher, build_url},
    model::{Coordinates, Location, PlaceWeather, WeatherBundle},
    normalize::{self, CURRENT_PARAMS, DAILY_PARAMS, HOURLY_PARAMS, Horizon},
};

const SEARCH_FAILED: &str = "Failed to search places. Please check your internet connection.";
const FETCH_FAILED: &str =
    "Failed to fetch weather data. Please check your internet connection and try again.";

/// Queries shorter than this never hit the network.
pub const MIN_QUERY_LEN: usize = 2;

/// Everything the client needs to know about endpoints and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub timezone: String,
    pub max_search_results: usize,
    pub horizon: Horizon,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    pub position: PositionOptions,
    pub cache_duration: Duration,
    pub cache_capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ClientSettings {
    fn from(config: &Config) -> Self {
        let s = &config.settings;
        Self {
            geocoding_url: config.api.geocoding_url.clone(),
            forecast_url: config.api.forecast_url.clone(),
            timezone: config.api.timezone.clone(),
            max_search_results: s.max_search_results,
            horizon: Horizon { hours: s.hourly_forecast_hours, days: s.forecast_days },
            request_timeout: s.request_timeout(),
            health_timeout: s.health_timeout(),
            position: PositionOptions {
                timeout: s.geolocation_timeout(),
                ..PositionOptions::default()
            },
            cache_duration: s.cache_duration(),
            cache_capacity: s.cache_capacity,
        }
    }
}

/// Resolves places and positions into weather bundles.
///
/// Forecasts are cached per coordinate pair. Nothing is retried: every
/// failure is handed to the caller as a [`WeatherError`] whose message is
/// ready to show to the user.
#[derive(Debug)]
pub struct WeatherClient {
    settings: ClientSettings,
    fetcher: Arc<dyn JsonFetcher>,
    position: Arc<dyn PositionProvider>,
    clock: Arc<dyn Clock>,
    cache: Mutex<WeatherCache>,
}

impl WeatherClient {
    pub fn new(
        settings: ClientSettings,
        fetcher: Arc<dyn JsonFetcher>,
        position: Arc<dyn PositionProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = WeatherCache::new(settings.cache_duration, settings.cache_capacity);
        Self { settings, fetcher, position, clock, cache: Mutex::new(cache) }
    }

    /// Client wired to the real network, the system clock and the
    /// configured home position.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        Ok(Self::new(
            ClientSettings::from(config),
            Arc::new(ReqwestFetcher::new()?),
            Arc::new(ConfiguredPosition::new(config.home)),
            Arc::new(SystemClock),
        ))
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Places matching `query`, best match first.
    #[tracing::instrument(skip(self))]
    pub async fn search_places(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let params = QueryParams::new()
            .set("name", query)
            .set("count", self.settings.max_search_results)
            .set("language", "en")
            .set("format", "json");
        let url = build_url(&self.settings.geocoding_url, &params)?;

        let value = self
            .fetcher
            .get_json(&url, self.settings.request_timeout)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "error searching places");
                e.with_network_message(SEARCH_FAILED)
            })?;

        let mut places = normalize::parse_locations(value)?;
        places.truncate(self.settings.max_search_results);
        tracing::debug!(count = places.len(), "places found");
        Ok(places)
    }

    /// Asks the position provider for a fix, bounded by the configured
    /// geolocation timeout.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_current_position(&self) -> Result<Coordinates, WeatherError> {
        let options = self.settings.position;
        let lookup = self.position.current_position(&options);

        let coordinates = match tokio::time::timeout(options.timeout, lookup).await {
            Ok(result) => result?,
            Err(_) => return Err(GeolocationError::Timeout.into()),
        };

        tracing::debug!(?coordinates, "position resolved");
        Ok(coordinates)
    }

    /// Best-effort place name for a coordinate pair. Falls back to the
    /// coordinates themselves when the lookup finds nothing or fails.
    #[tracing::instrument(skip(self))]
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Location {
        match self.lookup_coordinates(latitude, longitude).await {
            Ok(Some(location)) => location,
            Ok(None) => {
                tracing::debug!("no place at coordinates, using coordinates as name");
                Location::from_coordinates(latitude, longitude)
            }
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed, using coordinates as name");
                Location::from_coordinates(latitude, longitude)
            }
        }
    }

    async fn lookup_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Location>, WeatherError> {
        let params = QueryParams::new()
            .set("latitude", latitude)
            .set("longitude", longitude)
            .set("count", 1)
            .set("language", "en")
            .set("format", "json");
        let url = build_url(&self.settings.geocoding_url, &params)?;

        let value = self.fetcher.get_json(&url, self.settings.request_timeout).await?;
        Ok(normalize::parse_locations(value)?.into_iter().next())
    }

    /// Forecast for a coordinate pair, served from cache while fresh.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherBundle, WeatherError> {
        let key = coordinate_key(latitude, longitude);

        let cached = self.cache.lock().get(&key, self.clock.now());
        if let Some(bundle) = cached {
            tracing::debug!(%key, "using cached weather data");
            return Ok(bundle);
        }

        let params = QueryParams::new()
            .set("latitude", latitude)
            .set("longitude", longitude)
            .set_list("current", CURRENT_PARAMS)
            .set_list("hourly", HOURLY_PARAMS)
            .set_list("daily", DAILY_PARAMS)
            .set("timezone", &self.settings.timezone)
            .set("forecast_days", self.settings.horizon.days);
        let url = build_url(&self.settings.forecast_url, &params)?;

        let value = self
            .fetcher
            .get_json(&url, self.settings.request_timeout)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "error fetching weather data");
                e.with_network_message(FETCH_FAILED)
            })?;

        let now = self.clock.now();
        let bundle = normalize::normalize_forecast(value, self.settings.horizon, now.naive_utc())?;

        self.cache.lock().insert(key, bundle.clone(), now);
        Ok(bundle)
    }

    /// Weather at the best match for `name`.
    #[tracing::instrument(skip(self))]
    pub async fn get_weather_for_place(&self, name: &str) -> Result<PlaceWeather, WeatherError> {
        let place = self.search_places(name).await?.into_iter().next().ok_or_else(|| {
            WeatherError::NotFound(format!(
                "Place \"{}\" not found. Please check the spelling and try again.",
                name.trim()
            ))
        })?;

        let weather = self.fetch_weather(place.latitude, place.longitude).await?;
        Ok(PlaceWeather { location: place, weather })
    }

    /// Weather wherever the position provider says we are.
    #[tracing::instrument(skip(self))]
    pub async fn get_weather_for_current_position(&self) -> Result<PlaceWeather, WeatherError> {
        let position = self.resolve_current_position().await?;
        let place = self.reverse_geocode(position.latitude, position.longitude).await;
        let weather = self.fetch_weather(position.latitude, position.longitude).await?;

        let location = Location {
            latitude: position.latitude,
            longitude: position.longitude,
            ..place
        };
        Ok(PlaceWeather { location, weather })
    }

    /// Whether the geocoding endpoint answers at all. Never fails.
    pub async fn check_health(&self) -> bool {
        let params = QueryParams::new().set("name", "London").set("count", 1).set("format", "json");
        let url = match build_url(&self.settings.geocoding_url, &params) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                return false;
            }
        };

        match self.fetcher.get_json(&url, self.settings.health_timeout).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                false
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}
