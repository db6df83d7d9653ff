//! Open-Meteo response shapes and their conversion into domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{CurrentConditions, DailyPoint, HourlyPoint, Location, WeatherBundle},
};

pub const CURRENT_PARAMS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "is_day",
    "precipitation",
    "weather_code",
    "cloud_cover",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
];

pub const HOURLY_PARAMS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "precipitation_probability",
    "precipitation",
    "weather_code",
    "cloud_cover",
    "visibility",
    "wind_speed_10m",
    "wind_direction_10m",
];

pub const DAILY_PARAMS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "precipitation_sum",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
];

/// How much of the forecast to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub hours: usize,
    pub days: usize,
}

impl Default for Horizon {
    fn default() -> Self {
        Self { hours: 24, days: 7 }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

impl GeocodingResult {
    fn into_location(self) -> Location {
        Location {
            name: self.name,
            country: self.country.unwrap_or_else(|| "Unknown".to_string()),
            admin1: self.admin1.filter(|s| !s.is_empty()),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

pub(crate) fn parse_locations(value: Value) -> Result<Vec<Location>, WeatherError> {
    let parsed: GeocodingResponse = serde_json::from_value(value)
        .map_err(|e| WeatherError::DataShape(format!("geocoding response: {e}")))?;

    let results = parsed.results.unwrap_or_default();
    Ok(results.into_iter().map(GeocodingResult::into_location).collect())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawForecast {
    current: Option<RawCurrent>,
    hourly: Option<RawHourly>,
    daily: Option<RawDaily>,
    timezone: Option<String>,
    elevation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCurrent {
    time: Option<String>,
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<u8>,
    cloud_cover: Option<f64>,
    surface_pressure: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    is_day: Option<u8>,
}

type Series<T> = Option<Vec<Option<T>>>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHourly {
    time: Option<Vec<String>>,
    temperature_2m: Series<f64>,
    relative_humidity_2m: Series<f64>,
    precipitation_probability: Series<f64>,
    precipitation: Series<f64>,
    weather_code: Series<u8>,
    cloud_cover: Series<f64>,
    visibility: Series<f64>,
    wind_speed_10m: Series<f64>,
    wind_direction_10m: Series<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDaily {
    time: Option<Vec<String>>,
    weather_code: Series<u8>,
    temperature_2m_max: Series<f64>,
    temperature_2m_min: Series<f64>,
    apparent_temperature_max: Series<f64>,
    apparent_temperature_min: Series<f64>,
    precipitation_sum: Series<f64>,
    precipitation_probability_max: Series<f64>,
    wind_speed_10m_max: Series<f64>,
    wind_gusts_10m_max: Series<f64>,
    wind_direction_10m_dominant: Series<f64>,
}

/// Value at position `i` of an optional series.
fn at<T: Copy>(series: &Series<T>, i: usize) -> Option<T> {
    series.as_ref().and_then(|values| values.get(i).copied().flatten())
}

fn parse_time(raw: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| WeatherError::DataShape(format!("unexpected timestamp '{raw}': {e}")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| WeatherError::DataShape(format!("unexpected date '{raw}': {e}")))
}

/// Builds a [`WeatherBundle`] from a forecast payload.
///
/// Missing sections become empty; hourly and daily series are cut to
/// `horizon`. `now` stands in for a missing observation time.
pub fn normalize_forecast(
    value: Value,
    horizon: Horizon,
    now: NaiveDateTime,
) -> Result<WeatherBundle, WeatherError> {
    if !value.is_object() {
        return Err(WeatherError::DataShape("forecast response is not an object".to_string()));
    }

    let raw: RawForecast = serde_json::from_value(value)
        .map_err(|e| WeatherError::DataShape(format!("forecast response: {e}")))?;

    let current = raw.current.unwrap_or_default();
    let current = CurrentConditions {
        time: match current.time.as_deref() {
            Some(time) => parse_time(time)?,
            None => now,
        },
        temperature: current.temperature_2m,
        apparent_temperature: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        precipitation: current.precipitation,
        weather_code: current.weather_code,
        cloud_cover: current.cloud_cover,
        pressure: current.surface_pressure,
        wind_speed: current.wind_speed_10m,
        wind_direction: current.wind_direction_10m,
        is_day: current.is_day.map(|flag| flag != 0),
    };

    Ok(WeatherBundle {
        current,
        hourly: normalize_hourly(raw.hourly.unwrap_or_default(), horizon.hours)?,
        daily: normalize_daily(raw.daily.unwrap_or_default(), horizon.days)?,
        timezone: raw.timezone.unwrap_or_else(|| "UTC".to_string()),
        elevation: raw.elevation.unwrap_or(0.0),
    })
}

fn normalize_hourly(hourly: RawHourly, limit: usize) -> Result<Vec<HourlyPoint>, WeatherError> {
    let Some(times) = hourly.time.as_ref() else {
        return Ok(Vec::new());
    };

    times
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, time)| {
            Ok(HourlyPoint {
                time: parse_time(time)?,
                temperature: at(&hourly.temperature_2m, i),
                humidity: at(&hourly.relative_humidity_2m, i),
                precipitation_probability: at(&hourly.precipitation_probability, i),
                precipitation: at(&hourly.precipitation, i),
                weather_code: at(&hourly.weather_code, i),
                cloud_cover: at(&hourly.cloud_cover, i),
                visibility: at(&hourly.visibility, i),
                wind_speed: at(&hourly.wind_speed_10m, i),
                wind_direction: at(&hourly.wind_direction_10m, i),
            })
        })
        .collect()
}

fn normalize_daily(daily: RawDaily, limit: usize) -> Result<Vec<DailyPoint>, WeatherError> {
    let Some(dates) = daily.time.as_ref() else {
        return Ok(Vec::new());
    };

    dates
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, date)| {
            Ok(DailyPoint {
                date: parse_date(date)?,
                weather_code: at(&daily.weather_code, i),
                temperature_max: at(&daily.temperature_2m_max, i),
                temperature_min: at(&daily.temperature_2m_min, i),
                apparent_temperature_max: at(&daily.apparent_temperature_max, i),
                apparent_temperature_min: at(&daily.apparent_temperature_min, i),
                precipitation_sum: at(&daily.precipitation_sum, i),
                precipitation_probability: at(&daily.precipitation_probability_max, i),
                wind_speed_max: at(&daily.wind_speed_10m_max, i),
                wind_gusts_max: at(&daily.wind_gusts_10m_max, i),
                wind_direction: at(&daily.wind_direction_10m_dominant, i),
            })
        })
        .collect()
}
