//! Device position lookup behind a narrow trait.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::model::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location access denied. Please enable location services.")]
    PermissionDenied,
    #[error("Location information is unavailable.")]
    PositionUnavailable,
    #[error("Location request timed out. Please try again.")]
    Timeout,
    #[error("Geolocation is not supported on this system.")]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
    /// Oldest cached fix the provider may hand back.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            high_accuracy: true,
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[async_trait]
pub trait PositionProvider: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// Position taken from configuration or command-line flags.
///
/// With no coordinates configured the system is treated as having no
/// location support at all.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPosition {
    coordinates: Option<Coordinates>,
}

impl ConfiguredPosition {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl PositionProvider for ConfiguredPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        self.coordinates.ok_or(GeolocationError::Unsupported)
    }
}
