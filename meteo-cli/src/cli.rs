use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use meteo_core::{
    Config, ControllerSettings, DisplayController, FileStore, JsonStore, SystemClock, UnitSystem,
    WeatherClient,
};
use std::{fmt, process::ExitCode, sync::Arc};

use crate::render::TerminalRenderer;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather forecasts from Open-Meteo")]
pub struct Cli {
    /// Display units; the choice is remembered for later runs.
    #[arg(long, global = true)]
    pub unit: Option<UnitSystem>,

    /// Latitude reported as "my location". Overrides the configured home.
    #[arg(long, global = true, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude reported as "my location". Overrides the configured home.
    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather for a place, your location, or whatever was shown last.
    Show {
        /// Place name, e.g. "Lisbon".
        place: Option<String>,

        /// Use your location instead of a place name.
        #[arg(long, conflicts_with = "place")]
        here: bool,
    },

    /// List places matching a name.
    Search {
        query: String,
    },

    /// Browse weather interactively.
    Interactive,

    /// Set the default city, units and home position.
    Configure,

    /// Check whether the weather service is reachable.
    Health,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let mut config = Config::load()?;
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.set_home(lat, lon)?;
        }

        match self.command {
            Command::Show { place, here } => {
                let mut controller = controller(&config, self.unit)?;
                let outcome = match place {
                    Some(place) => controller.load_weather_for_place(&place).await,
                    None if here => controller.load_weather_for_current_position().await,
                    None => controller.start().await,
                };
                // Failures were already rendered.
                Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Search { query } => search(&config, &query).await,
            Command::Interactive => {
                let controller = controller(&config, self.unit)?;
                interactive(controller).await
            }
            Command::Configure => configure(config),
            Command::Health => {
                let client = WeatherClient::from_config(&config)?;
                if client.check_health().await {
                    println!("Open-Meteo is reachable.");
                    Ok(ExitCode::SUCCESS)
                } else {
                    println!("Open-Meteo is not reachable.");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn controller(config: &Config, unit: Option<UnitSystem>) -> Result<DisplayController> {
    let client = WeatherClient::from_config(config).context("Failed to build HTTP client")?;

    let path = FileStore::default_path()?;
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open state file: {}", path.display()))?;

    let mut controller = DisplayController::new(
        Arc::new(client),
        JsonStore::new(Arc::new(store)),
        Arc::new(TerminalRenderer),
        Arc::new(SystemClock),
        ControllerSettings::from(config),
    );
    if let Some(unit) = unit {
        controller.set_unit(unit);
    }
    Ok(controller)
}

async fn search(config: &Config, query: &str) -> Result<ExitCode> {
    let client = WeatherClient::from_config(config)?;
    let places = client.search_places(query).await?;

    if places.is_empty() {
        println!("No places found for \"{}\".", query.trim());
        return Ok(ExitCode::FAILURE);
    }

    for (i, place) in places.iter().enumerate() {
        println!(
            "{:>2}. {}  [{:.2}, {:.2}]",
            i + 1,
            place.suggestion_label(),
            place.latitude,
            place.longitude
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    MyLocation,
    ToggleUnit,
    Retry,
    Quit,
}

impl Action {
    const ALL: [Action; 5] =
        [Action::Search, Action::MyLocation, Action::ToggleUnit, Action::Retry, Action::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Search => "Search for a place",
            Action::MyLocation => "Use my location",
            Action::ToggleUnit => "Switch °C / °F",
            Action::Retry => "Retry",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Unwraps a prompt answer. `None` means the user backed out of the prompt
/// with Esc or Ctrl-C.
fn answered<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn interactive(mut controller: DisplayController) -> Result<ExitCode> {
    // Errors are rendered by the controller; the menu stays usable.
    let _ = controller.start().await;

    loop {
        // Sitting at the menu counts as time away from the screen.
        controller.suspend();
        let menu = Select::new("What next?", Action::ALL.to_vec()).prompt();
        let action = answered(menu)?.unwrap_or(Action::Quit);
        if action != Action::Quit {
            let _ = controller.on_visibility_regained().await;
        }

        match action {
            Action::Search => {
                let Some(query) = answered(Text::new("Place:").prompt())? else {
                    continue;
                };
                pick_place(&mut controller, &query).await?;
            }
            Action::MyLocation => {
                let _ = controller.load_weather_for_current_position().await;
            }
            Action::ToggleUnit => controller.toggle_unit(),
            Action::Retry => {
                let _ = controller.retry().await;
            }
            Action::Quit => break,
        }
    }

    controller.suspend();
    Ok(ExitCode::SUCCESS)
}

async fn pick_place(controller: &mut DisplayController, query: &str) -> Result<()> {
    let places = controller.refresh_suggestions(query).await;
    if places.is_empty() {
        // Lets the controller report "not found" or a short query.
        let _ = controller.submit_search(query).await;
        return Ok(());
    }

    let labels: Vec<String> = places.iter().map(|place| place.suggestion_label()).collect();
    let Some(choice) = answered(Select::new("Did you mean:", labels).raw_prompt())? else {
        controller.on_outside_click();
        return Ok(());
    };

    let _ = controller.select_suggestion(choice.index).await;
    Ok(())
}

fn configure(mut config: Config) -> Result<ExitCode> {
    let default_city = Text::new("Default city:").with_default(&config.default_city).prompt()?;

    let units = UnitSystem::all().to_vec();
    let starting = units.iter().position(|u| *u == config.preferred_unit).unwrap_or(0);
    let unit = Select::new("Preferred unit:", units).with_starting_cursor(starting).prompt()?;

    config.default_city = default_city.trim().to_string();
    config.preferred_unit = unit;

    let set_home = Confirm::new("Set a home position for \"my location\"?")
        .with_default(config.home.is_some())
        .prompt()?;
    if set_home {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 51.5")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. -0.12")
            .prompt()?;
        config.set_home(latitude, longitude)?;
    } else {
        config.home = None;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(ExitCode::SUCCESS)
}
