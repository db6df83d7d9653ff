//! Core library for the `meteo` weather app.
//!
//! This crate defines:
//! - The Open-Meteo client with its response cache
//! - Unit conversion and display formatting
//! - The display controller that drives a [`Renderer`]
//! - Configuration and persisted preferences
//!
//! It is used by `meteo-cli`, but any front end that implements
//! [`Renderer`] can drive it.

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod geolocation;
pub mod http;
pub mod model;
pub mod normalize;
pub mod scheduler;
pub mod storage;
pub mod units;
pub mod view;

pub use client::{ClientSettings, WeatherClient};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use controller::{ControllerSettings, DisplayController, Renderer, SearchKey, ViewState};
pub use error::{ErrorKind, WeatherError};
pub use geolocation::{GeolocationError, PositionProvider};
pub use http::{JsonFetcher, ReqwestFetcher};
pub use model::{Coordinates, Location, PlaceWeather, WeatherBundle};
pub use storage::{FileStore, JsonStore, KeyValueStore, MemoryStore};
pub use units::UnitSystem;
pub use view::WeatherView;
