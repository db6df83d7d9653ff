use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A named geocoded point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    /// First-level administrative region (state, province, ...).
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Stand-in used when reverse geocoding finds nothing.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            name: format!("{latitude:.2}, {longitude:.2}"),
            country: "Unknown".to_string(),
            admin1: None,
            latitude,
            longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    fn region(&self) -> Option<&str> {
        self.admin1.as_deref().filter(|s| !s.is_empty())
    }

    /// "Paris, Île-de-France", or "Paris, France" when no region is known.
    pub fn display_label(&self) -> String {
        match self.region() {
            Some(region) => format!("{}, {}", self.name, region),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    /// "Paris, France (Île-de-France)", used in the suggestion list.
    pub fn suggestion_label(&self) -> String {
        match self.region() {
            Some(region) => format!("{}, {} ({})", self.name, self.country, region),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Conditions at the time of the request. Every measurement may be missing
/// upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<u8>,
    pub cloud_cover: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub is_day: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<u8>,
    pub cloud_cover: Option<f64>,
    /// Metres.
    pub visibility: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub weather_code: Option<u8>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub apparent_temperature_max: Option<f64>,
    pub apparent_temperature_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_gusts_max: Option<f64>,
    pub wind_direction: Option<f64>,
}

/// Normalized current + hourly + daily payload for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    pub timezone: String,
    pub elevation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceWeather {
    pub location: Location,
    pub weather: WeatherBundle,
}
