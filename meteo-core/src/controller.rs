//! The display controller: turns user actions into client calls and client
//! results into view updates.

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

use crate::{
    client::{MIN_QUERY_LEN, WeatherClient},
    clock::Clock,
    config::Config,
    error::WeatherError,
    model::{Location, PlaceWeather},
    scheduler::Debouncer,
    storage::{JsonStore, LAST_LOCATION_KEY, LAST_UPDATE_KEY, LastLocation, PREFERRED_UNIT_KEY},
    units::UnitSystem,
    view::WeatherView,
};

/// Where the controller draws. Implementations must be cheap to call; the
/// debounced suggestion lookup calls them from a background task.
pub trait Renderer: Send + Sync {
    fn show_loading(&self);
    fn show_error(&self, message: &str);
    fn show_weather(&self, view: &WeatherView);
    fn show_suggestions(&self, places: &[Location]);
    fn hide_suggestions(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Content(Box<PlaceWeather>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub default_city: String,
    /// Unit used until the user picks one.
    pub initial_unit: UnitSystem,
    pub search_delay: Duration,
    pub suggestion_hide_delay: Duration,
    pub refresh_after: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_city: config.default_city.clone(),
            initial_unit: config.preferred_unit,
            search_delay: config.settings.search_delay(),
            suggestion_hide_delay: config.settings.suggestion_hide_delay(),
            refresh_after: config.settings.refresh_after(),
        }
    }
}

pub struct DisplayController {
    client: Arc<WeatherClient>,
    store: JsonStore,
    renderer: Arc<dyn Renderer>,
    clock: Arc<dyn Clock>,
    settings: ControllerSettings,
    unit: UnitSystem,
    state: ViewState,
    /// Last payload that made it to the screen; survives later failures.
    current: Option<PlaceWeather>,
    suggestions: Arc<Mutex<Vec<Location>>>,
    lookup: Debouncer,
    hide: Debouncer,
}

impl DisplayController {
    /// Builds the controller and restores the saved unit preference.
    pub fn new(
        client: Arc<WeatherClient>,
        store: JsonStore,
        renderer: Arc<dyn Renderer>,
        clock: Arc<dyn Clock>,
        settings: ControllerSettings,
    ) -> Self {
        let unit = store.get(PREFERRED_UNIT_KEY, settings.initial_unit);
        Self {
            client,
            store,
            renderer,
            clock,
            settings,
            unit,
            state: ViewState::Loading,
            current: None,
            suggestions: Arc::new(Mutex::new(Vec::new())),
            lookup: Debouncer::new(),
            hide: Debouncer::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn unit(&self) -> UnitSystem {
        self.unit
    }

    pub fn current(&self) -> Option<&PlaceWeather> {
        self.current.as_ref()
    }

    pub fn suggestions(&self) -> Vec<Location> {
        self.suggestions.lock().clone()
    }

    pub fn client(&self) -> &WeatherClient {
        &self.client
    }

    /// App start: probe the API, then show whatever the user looked at last.
    pub async fn start(&mut self) -> Result<(), WeatherError> {
        if !self.client.check_health().await {
            tracing::warn!("API health check failed, but continuing");
        }
        self.load_default_weather().await
    }

    pub async fn load_default_weather(&mut self) -> Result<(), WeatherError> {
        match self.last_location() {
            Some(LastLocation::City { name }) => self.load_weather_for_place(&name).await,
            Some(LastLocation::Coordinates { .. }) => {
                if let Err(e) = self.load_weather_for_current_position().await {
                    tracing::info!(error = %e, "falling back to the default city");
                    let city = self.settings.default_city.clone();
                    return self.load_weather_for_place(&city).await;
                }
                Ok(())
            }
            None => {
                let city = self.settings.default_city.clone();
                self.load_weather_for_place(&city).await
            }
        }
    }

    pub async fn retry(&mut self) -> Result<(), WeatherError> {
        match self.last_location() {
            Some(LastLocation::City { name }) => self.load_weather_for_place(&name).await,
            Some(LastLocation::Coordinates { .. }) => {
                self.load_weather_for_current_position().await
            }
            None => {
                let city = self.settings.default_city.clone();
                self.load_weather_for_place(&city).await
            }
        }
    }

    pub async fn load_weather_for_place(&mut self, name: &str) -> Result<(), WeatherError> {
        self.show_loading();

        let data = match self.client.get_weather_for_place(name).await {
            Ok(data) => data,
            Err(e) => return Err(self.fail(e)),
        };

        self.display(data);
        self.remember(&LastLocation::City { name: name.trim().to_string() });
        Ok(())
    }

    pub async fn load_weather_for_current_position(&mut self) -> Result<(), WeatherError> {
        self.show_loading();

        let data = match self.client.get_weather_for_current_position().await {
            Ok(data) => data,
            Err(e) => return Err(self.fail(e)),
        };

        let remembered = LastLocation::Coordinates {
            latitude: data.location.latitude,
            longitude: data.location.longitude,
        };
        self.display(data);
        self.remember(&remembered);
        Ok(())
    }

    /// Switches units and redraws the payload on screen. Never fetches.
    pub fn set_unit(&mut self, unit: UnitSystem) {
        self.unit = unit;
        if let Err(e) = self.store.set(PREFERRED_UNIT_KEY, &unit) {
            tracing::warn!(error = %e, "could not save unit preference");
        }

        if matches!(self.state, ViewState::Content(_)) {
            self.render_content();
        }
    }

    pub fn toggle_unit(&mut self) {
        self.set_unit(self.unit.toggled());
    }

    /// Text in the search box changed. Looks up suggestions once typing
    /// pauses for the configured delay.
    pub fn on_search_input(&mut self, query: &str) {
        let query = query.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            self.lookup.cancel_pending();
            self.suggestions.lock().clear();
            self.renderer.hide_suggestions();
            return;
        }

        let client = self.client.clone();
        let renderer = self.renderer.clone();
        let suggestions = self.suggestions.clone();
        self.lookup.schedule(self.settings.search_delay, async move {
            lookup_suggestions(&client, renderer.as_ref(), &suggestions, &query).await;
        });
    }

    /// Suggestion lookup without the debounce delay.
    pub async fn refresh_suggestions(&mut self, query: &str) -> Vec<Location> {
        self.lookup.cancel_pending();

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.suggestions.lock().clear();
            self.renderer.hide_suggestions();
            return Vec::new();
        }

        lookup_suggestions(&self.client, self.renderer.as_ref(), &self.suggestions, query).await;
        self.suggestions()
    }

    pub async fn on_search_key(&mut self, key: SearchKey, query: &str) -> Result<(), WeatherError> {
        match key {
            SearchKey::Enter => self.submit_search(query).await,
            SearchKey::Escape => {
                self.hide_suggestions();
                Ok(())
            }
        }
    }

    /// Search button or Enter. An empty box does nothing.
    pub async fn submit_search(&mut self, query: &str) -> Result<(), WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.hide_suggestions();
        self.load_weather_for_place(query).await
    }

    /// The search box lost focus. Suggestions stay up for a short grace
    /// period so a click on one of them still lands.
    pub fn on_search_blur(&mut self) {
        let renderer = self.renderer.clone();
        let suggestions = self.suggestions.clone();
        self.hide.schedule(self.settings.suggestion_hide_delay, async move {
            suggestions.lock().clear();
            renderer.hide_suggestions();
        });
    }

    pub fn on_outside_click(&mut self) {
        self.hide_suggestions();
    }

    pub async fn select_suggestion(&mut self, index: usize) -> Result<(), WeatherError> {
        let place = self.suggestions.lock().get(index).cloned().ok_or_else(|| {
            WeatherError::Validation(format!("No suggestion at position {}", index + 1))
        })?;

        self.hide_suggestions();
        self.load_weather_for_place(&place.name).await
    }

    /// The app came back to the foreground. Reloads the last location when
    /// the previous session ended long enough ago; returns whether it did.
    pub async fn on_visibility_regained(&mut self) -> Result<bool, WeatherError> {
        let last_update: Option<i64> = self.store.get_opt(LAST_UPDATE_KEY);
        let now = self.clock.now().timestamp_millis();
        let threshold = i64::try_from(self.settings.refresh_after.as_millis()).unwrap_or(i64::MAX);

        let stale = last_update.is_none_or(|ts| ts < now.saturating_sub(threshold));
        if !stale || self.current.is_none() {
            return Ok(false);
        }

        tracing::info!("refreshing weather data after extended absence");
        match self.last_location() {
            Some(LastLocation::City { name }) => self.load_weather_for_place(&name).await?,
            Some(LastLocation::Coordinates { .. }) => {
                self.load_weather_for_current_position().await?
            }
            None => return Ok(false),
        }
        Ok(true)
    }

    /// Records when the session went to the background.
    pub fn suspend(&self) {
        let now = self.clock.now().timestamp_millis();
        if let Err(e) = self.store.set(LAST_UPDATE_KEY, &now) {
            tracing::warn!(error = %e, "could not save last update time");
        }
    }

    fn last_location(&self) -> Option<LastLocation> {
        self.store.get_opt(LAST_LOCATION_KEY)
    }

    fn remember(&self, location: &LastLocation) {
        if let Err(e) = self.store.set(LAST_LOCATION_KEY, location) {
            tracing::warn!(error = %e, "could not save last location");
        }
    }

    /// Hidden suggestions can no longer be selected.
    fn hide_suggestions(&mut self) {
        self.lookup.cancel_pending();
        self.hide.cancel_pending();
        self.suggestions.lock().clear();
        self.renderer.hide_suggestions();
    }

    fn show_loading(&mut self) {
        self.state = ViewState::Loading;
        self.renderer.show_loading();
    }

    fn fail(&mut self, err: WeatherError) -> WeatherError {
        tracing::error!(error = %err, "error loading weather");
        let message = err.user_message();
        self.renderer.show_error(&message);
        self.state = ViewState::Error(message);
        err
    }

    fn display(&mut self, data: PlaceWeather) {
        self.current = Some(data.clone());
        self.state = ViewState::Content(Box::new(data));
        self.render_content();
    }

    fn render_content(&self) {
        if let ViewState::Content(data) = &self.state {
            // Open-Meteo reports local times, so the observation date is the
            // location's "today".
            let today = data.weather.current.time.date();
            let view = WeatherView::build(data, self.unit, today);
            self.renderer.show_weather(&view);
        }
    }
}

async fn lookup_suggestions(
    client: &WeatherClient,
    renderer: &dyn Renderer,
    suggestions: &Mutex<Vec<Location>>,
    query: &str,
) {
    match client.search_places(query).await {
        Ok(places) if !places.is_empty() => {
            renderer.show_suggestions(&places);
            *suggestions.lock() = places;
        }
        Ok(_) => {
            suggestions.lock().clear();
            renderer.hide_suggestions();
        }
        Err(e) => {
            tracing::warn!(error = %e, "suggestion lookup failed");
            suggestions.lock().clear();
            renderer.hide_suggestions();
        }
    }
}
