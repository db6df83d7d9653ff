//! Unit conversions used when rendering in the imperial system.
//!
//! Upstream data is always metric: °C, km/h, hPa, metres, millimetres.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Display unit preference. Named after the temperature scale, but it
/// switches every measurement (wind, pressure, distance, precipitation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Celsius,
    Fahrenheit,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Celsius => "celsius",
            UnitSystem::Fahrenheit => "fahrenheit",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Celsius => UnitSystem::Fahrenheit,
            UnitSystem::Fahrenheit => UnitSystem::Celsius,
        }
    }

    pub fn is_imperial(self) -> bool {
        self == UnitSystem::Fahrenheit
    }

    pub fn temperature_label(self) -> &'static str {
        match self {
            UnitSystem::Celsius => "°C",
            UnitSystem::Fahrenheit => "°F",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Celsius, UnitSystem::Fahrenheit]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "celsius" | "c" | "metric" => Ok(UnitSystem::Celsius),
            "fahrenheit" | "f" | "imperial" => Ok(UnitSystem::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * 0.621371
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * 1.60934
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * 0.02953
}

pub fn inhg_to_hpa(inhg: f64) -> f64 {
    inhg * 33.8639
}

pub fn km_to_miles(km: f64) -> f64 {
    km * 0.621371
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles * 1.60934
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm * 0.0393701
}

pub fn inches_to_mm(inches: f64) -> f64 {
    inches * 25.4
}
