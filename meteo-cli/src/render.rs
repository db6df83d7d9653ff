use meteo_core::{Location, Renderer, WeatherView};

/// Prints controller output to the terminal. Weather goes to stdout,
/// progress and errors to stderr.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn show_loading(&self) {
        eprintln!("Loading weather data...");
    }

    fn show_error(&self, message: &str) {
        eprintln!("⚠️  {message}");
    }

    fn show_weather(&self, view: &WeatherView) {
        let label = view.unit.temperature_label();
        let current = &view.current;

        println!();
        println!("📍 {}", current.location);
        println!("   {}", current.date);
        println!();
        println!("   {}  {}{label}  {}", current.icon, current.temperature, current.description);
        println!(
            "   Feels like {}{label} · Humidity {} · Wind {} {}",
            current.feels_like, current.humidity, current.wind, current.wind_direction
        );
        println!(
            "   Visibility {} · Pressure {} · Precipitation {}",
            current.visibility, current.pressure, current.precipitation
        );

        if !view.hourly.is_empty() {
            println!();
            println!("Next hours");
            for hour in &view.hourly {
                println!(
                    "  {:>5}  {}  {:>4}{label}  {:>4}",
                    hour.time, hour.icon, hour.temperature, hour.precipitation_chance
                );
            }
        }

        if !view.daily.is_empty() {
            println!();
            println!("{}-day forecast", view.daily.len());
            for day in &view.daily {
                println!(
                    "  {:<10} {}  {:<28} {:>4}° / {}°",
                    day.day, day.icon, day.description, day.high, day.low
                );
            }
        }
        println!();
    }

    // The interactive picker presents suggestions itself.
    fn show_suggestions(&self, places: &[Location]) {
        tracing::debug!(count = places.len(), "suggestions ready");
    }

    fn hide_suggestions(&self) {}
}
