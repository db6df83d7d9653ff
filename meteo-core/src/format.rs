//! String formatting for optional measurements, dates and weather codes.
//!
//! Missing values never fail: they render as a placeholder.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::units::{self, UnitSystem};

pub const PLACEHOLDER: &str = "--";

/// Rounds half-way cases towards positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Rounded temperature without a unit label, e.g. `"21"`.
pub fn temperature(celsius: Option<f64>, unit: UnitSystem) -> String {
    let Some(celsius) = celsius else {
        return PLACEHOLDER.to_string();
    };

    let value = if unit.is_imperial() { units::celsius_to_fahrenheit(celsius) } else { celsius };
    round_half_up(value).to_string()
}

pub fn wind_speed(kmh: Option<f64>, unit: UnitSystem) -> String {
    let Some(kmh) = kmh else {
        return PLACEHOLDER.to_string();
    };

    if unit.is_imperial() {
        format!("{} mph", round_half_up(units::kmh_to_mph(kmh)))
    } else {
        format!("{} km/h", round_half_up(kmh))
    }
}

pub fn pressure(hpa: Option<f64>, unit: UnitSystem) -> String {
    let Some(hpa) = hpa else {
        return PLACEHOLDER.to_string();
    };

    if unit.is_imperial() {
        format!("{:.2} inHg", units::hpa_to_inhg(hpa))
    } else {
        format!("{} hPa", round_half_up(hpa))
    }
}

pub fn visibility(metres: Option<f64>, unit: UnitSystem) -> String {
    let Some(metres) = metres else {
        return PLACEHOLDER.to_string();
    };

    let km = metres / 1000.0;
    if unit.is_imperial() {
        format!("{:.1} mi", units::km_to_miles(km))
    } else {
        format!("{km:.1} km")
    }
}

/// Missing precipitation reads as none at all.
pub fn precipitation(mm: Option<f64>, unit: UnitSystem) -> String {
    let Some(mm) = mm else {
        return "0".to_string();
    };

    if unit.is_imperial() {
        format!("{:.2} in", units::mm_to_inches(mm))
    } else {
        format!("{mm:.1} mm")
    }
}

pub fn humidity(percent: Option<f64>) -> String {
    match percent {
        Some(value) => format!("{}%", round_half_up(value)),
        None => format!("{PLACEHOLDER}%"),
    }
}

pub fn percentage(percent: Option<f64>) -> String {
    format!("{}%", round_half_up(percent.unwrap_or(0.0)))
}

/// "Monday, January 1, 2024"
pub fn long_date(time: NaiveDateTime) -> String {
    time.format("%A, %B %-d, %Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockStyle {
    /// "3 PM"
    #[default]
    TwelveHour,
    /// "15:00"
    TwentyFourHour,
}

pub fn hour_label(time: NaiveDateTime, style: ClockStyle) -> String {
    match style {
        ClockStyle::TwelveHour => time.format("%-I %p").to_string(),
        ClockStyle::TwentyFourHour => time.format("%H:%M").to_string(),
    }
}

/// "Today", "Tomorrow", or the weekday name.
pub fn day_of_week(date: NaiveDate, today: NaiveDate, short: bool) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(date) {
        return "Tomorrow".to_string();
    }

    let weekday = date.weekday();
    let name = match weekday {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    };
    if short { name[..3].to_string() } else { name.to_string() }
}

struct WeatherCodeInfo {
    code: u8,
    description: &'static str,
    icon: &'static str,
    night_icon: &'static str,
}

// WMO weather interpretation codes as reported by Open-Meteo.
const WEATHER_CODES: &[WeatherCodeInfo] = &[
    WeatherCodeInfo { code: 0, description: "Clear sky", icon: "☀️", night_icon: "🌙" },
    WeatherCodeInfo { code: 1, description: "Mainly clear", icon: "🌤️", night_icon: "🌙" },
    WeatherCodeInfo { code: 2, description: "Partly cloudy", icon: "⛅", night_icon: "☁️" },
    WeatherCodeInfo { code: 3, description: "Overcast", icon: "☁️", night_icon: "☁️" },
    WeatherCodeInfo { code: 45, description: "Fog", icon: "🌫️", night_icon: "🌫️" },
    WeatherCodeInfo { code: 48, description: "Depositing rime fog", icon: "🌫️", night_icon: "🌫️" },
    WeatherCodeInfo { code: 51, description: "Light drizzle", icon: "🌦️", night_icon: "🌦️" },
    WeatherCodeInfo { code: 53, description: "Moderate drizzle", icon: "🌦️", night_icon: "🌦️" },
    WeatherCodeInfo { code: 55, description: "Dense drizzle", icon: "🌧️", night_icon: "🌧️" },
    WeatherCodeInfo { code: 56, description: "Light freezing drizzle", icon: "🌨️", night_icon: "🌨️" },
    WeatherCodeInfo { code: 57, description: "Dense freezing drizzle", icon: "🌨️", night_icon: "🌨️" },
    WeatherCodeInfo { code: 61, description: "Slight rain", icon: "🌧️", night_icon: "🌧️" },
    WeatherCodeInfo { code: 63, description: "Moderate rain", icon: "🌧️", night_icon: "🌧️" },
    WeatherCodeInfo { code: 65, description: "Heavy rain", icon: "⛈️", night_icon: "⛈️" },
    WeatherCodeInfo { code: 66, description: "Light freezing rain", icon: "🌨️", night_icon: "🌨️" },
    WeatherCodeInfo { code: 67, description: "Heavy freezing rain", icon: "🌨️", night_icon: "🌨️" },
    WeatherCodeInfo { code: 71, description: "Slight snow fall", icon: "🌨️", night_icon: "🌨️" },
    WeatherCodeInfo { code: 73, description: "Moderate snow fall", icon: "❄️", night_icon: "❄️" },
    WeatherCodeInfo { code: 75, description: "Heavy snow fall", icon: "❄️", night_icon: "❄️" },
    WeatherCodeInfo { code: 77, description: "Snow grains", icon: "❄️", night_icon: "❄️" },
    WeatherCodeInfo { code: 80, description: "Slight rain showers", icon: "🌦️", night_icon: "🌦️" },
    WeatherCodeInfo { code: 81, description: "Moderate rain showers", icon: "🌧️", night_icon: "🌧️" },
    WeatherCodeInfo { code: 82, description: "Violent rain showers", icon: "⛈️", night_icon: "⛈️" },
    WeatherCodeInfo { code: 85, description: "Slight snow showers", icon: "🌨️", night_icon: "🌨️" },
    WeatherCodeInfo { code: 86, description: "Heavy snow showers", icon: "❄️", night_icon: "❄️" },
    WeatherCodeInfo { code: 95, description: "Thunderstorm", icon: "⛈️", night_icon: "⛈️" },
    WeatherCodeInfo { code: 96, description: "Thunderstorm with slight hail", icon: "⛈️", night_icon: "⛈️" },
    WeatherCodeInfo { code: 99, description: "Thunderstorm with heavy hail", icon: "⛈️", night_icon: "⛈️" },
];

fn lookup(code: Option<u8>) -> Option<&'static WeatherCodeInfo> {
    let code = code?;
    WEATHER_CODES.iter().find(|info| info.code == code)
}

pub fn weather_description(code: Option<u8>) -> &'static str {
    lookup(code).map_or("Unknown", |info| info.description)
}

pub fn weather_icon(code: Option<u8>, is_day: bool) -> &'static str {
    match lookup(code) {
        Some(info) if is_day => info.icon,
        Some(info) => info.night_icon,
        None => "❓",
    }
}

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction; a missing bearing reads as north.
pub fn wind_direction(degrees: Option<f64>) -> &'static str {
    let Some(degrees) = degrees else {
        return COMPASS[0];
    };

    let index = round_half_up(degrees / 22.5).rem_euclid(16) as usize;
    COMPASS[index]
}
