//! Display-ready strings for the three sections of the weather view.

use chrono::NaiveDate;

use crate::{
    format::{self, ClockStyle},
    model::PlaceWeather,
    units::UnitSystem,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentView {
    pub location: String,
    pub date: String,
    /// Rounded value without a unit label.
    pub temperature: String,
    pub icon: &'static str,
    pub description: &'static str,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub wind_direction: &'static str,
    pub visibility: String,
    pub pressure: String,
    pub precipitation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyView {
    pub time: String,
    pub icon: &'static str,
    pub temperature: String,
    pub precipitation_chance: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyView {
    pub day: String,
    pub icon: &'static str,
    pub description: &'static str,
    pub high: String,
    pub low: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherView {
    pub unit: UnitSystem,
    pub current: CurrentView,
    pub hourly: Vec<HourlyView>,
    pub daily: Vec<DailyView>,
}

impl WeatherView {
    /// `today` decides which days read as "Today" and "Tomorrow".
    pub fn build(data: &PlaceWeather, unit: UnitSystem, today: NaiveDate) -> Self {
        let current = &data.weather.current;

        // Current conditions carry no visibility; the first forecast hour is
        // the closest reading.
        let visibility = data.weather.hourly.first().and_then(|hour| hour.visibility);

        let current = CurrentView {
            location: data.location.display_label(),
            date: format::long_date(current.time),
            temperature: format::temperature(current.temperature, unit),
            icon: format::weather_icon(current.weather_code, current.is_day.unwrap_or(true)),
            description: format::weather_description(current.weather_code),
            feels_like: format::temperature(current.apparent_temperature, unit),
            humidity: format::humidity(current.humidity),
            wind: format::wind_speed(current.wind_speed, unit),
            wind_direction: format::wind_direction(current.wind_direction),
            visibility: format::visibility(visibility, unit),
            pressure: format::pressure(current.pressure, unit),
            precipitation: format::precipitation(current.precipitation, unit),
        };

        let hourly = data
            .weather
            .hourly
            .iter()
            .map(|hour| HourlyView {
                time: format::hour_label(hour.time, ClockStyle::TwelveHour),
                icon: format::weather_icon(hour.weather_code, true),
                temperature: format::temperature(hour.temperature, unit),
                precipitation_chance: format::percentage(hour.precipitation_probability),
            })
            .collect();

        let daily = data
            .weather
            .daily
            .iter()
            .map(|day| DailyView {
                day: format::day_of_week(day.date, today, false),
                icon: format::weather_icon(day.weather_code, true),
                description: format::weather_description(day.weather_code),
                high: format::temperature(day.temperature_max, unit),
                low: format::temperature(day.temperature_min, unit),
            })
            .collect();

        Self { unit, current, hourly, daily }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, DailyPoint, HourlyPoint, Location, WeatherBundle};
    use chrono::NaiveDateTime;

    fn noon() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-01T12:00", "%Y-%m-%dT%H:%M").unwrap()
    }

    fn sample() -> PlaceWeather {
        let current = CurrentConditions {
            time: noon(),
            temperature: Some(20.0),
            apparent_temperature: None,
            humidity: Some(55.0),
            precipitation: None,
            weather_code: Some(0),
            cloud_cover: None,
            pressure: Some(1013.0),
            wind_speed: Some(10.0),
            wind_direction: Some(270.0),
            is_day: Some(false),
        };
        let hour = HourlyPoint {
            time: noon(),
            temperature: Some(21.0),
            humidity: None,
            precipitation_probability: None,
            precipitation: None,
            weather_code: Some(61),
            cloud_cover: None,
            visibility: Some(24_000.0),
            wind_speed: None,
            wind_direction: None,
        };
        let day = DailyPoint {
            date: noon().date(),
            weather_code: Some(3),
            temperature_max: Some(25.0),
            temperature_min: None,
            apparent_temperature_max: None,
            apparent_temperature_min: None,
            precipitation_sum: None,
            precipitation_probability: None,
            wind_speed_max: None,
            wind_gusts_max: None,
            wind_direction: None,
        };

        PlaceWeather {
            location: Location {
                name: "Madrid".into(),
                country: "Spain".into(),
                admin1: None,
                latitude: 40.4,
                longitude: -3.7,
            },
            weather: WeatherBundle {
                current,
                hourly: vec![hour],
                daily: vec![day],
                timezone: "Europe/Madrid".into(),
                elevation: 650.0,
            },
        }
    }

    #[test]
    fn builds_all_three_sections() {
        let view = WeatherView::build(&sample(), UnitSystem::Celsius, noon().date());

        assert_eq!(view.current.location, "Madrid, Spain");
        assert_eq!(view.current.date, "Monday, January 1, 2024");
        assert_eq!(view.current.temperature, "20");
        assert_eq!(view.current.icon, "🌙");
        assert_eq!(view.current.description, "Clear sky");
        assert_eq!(view.current.feels_like, "--");
        assert_eq!(view.current.wind, "10 km/h");
        assert_eq!(view.current.wind_direction, "W");
        assert_eq!(view.current.visibility, "24.0 km");

        assert_eq!(view.hourly.len(), 1);
        assert_eq!(view.hourly[0].time, "12 PM");
        assert_eq!(view.hourly[0].precipitation_chance, "0%");

        assert_eq!(view.daily[0].day, "Today");
        assert_eq!(view.daily[0].description, "Overcast");
        assert_eq!(view.daily[0].low, "--");
    }

    #[test]
    fn unit_changes_every_measurement() {
        let view = WeatherView::build(&sample(), UnitSystem::Fahrenheit, noon().date());

        assert_eq!(view.unit, UnitSystem::Fahrenheit);
        assert_eq!(view.current.temperature, "68");
        assert_eq!(view.current.wind, "6 mph");
        assert_eq!(view.current.pressure, "29.91 inHg");
        assert_eq!(view.daily[0].high, "77");
    }
}
