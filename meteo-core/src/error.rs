use thiserror::Error;

use crate::geolocation::GeolocationError;

/// Coarse classification of a [`WeatherError`], handy for matching in
/// callers that only care about the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Timeout,
    NotFound,
    Geolocation,
    DataShape,
    Storage,
}

/// Every failure surfaced by the weather client and its collaborators.
///
/// The `Display` output of each variant is the user-facing message that the
/// display controller shows verbatim.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response or network failure.
    #[error("{message}")]
    Transport { message: String, status: Option<u16> },

    /// The request deadline expired before a response arrived.
    #[error("{message}")]
    Timeout { message: String },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("Invalid weather data received from server: {0}")]
    DataShape(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl WeatherError {
    pub fn timeout() -> Self {
        WeatherError::Timeout { message: "Request timeout".to_string() }
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        WeatherError::Transport { message: message.into(), status: None }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Validation(_) => ErrorKind::Validation,
            WeatherError::Transport { .. } => ErrorKind::Transport,
            WeatherError::Timeout { .. } => ErrorKind::Timeout,
            WeatherError::NotFound(_) => ErrorKind::NotFound,
            WeatherError::Geolocation(_) => ErrorKind::Geolocation,
            WeatherError::DataShape(_) => ErrorKind::DataShape,
            WeatherError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status code, when the failure came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Replace the message of a transport or timeout failure with a
    /// friendlier one, keeping the kind and status. Other variants pass
    /// through untouched.
    pub fn with_network_message<S: Into<String>>(self, message: S) -> Self {
        match self {
            WeatherError::Transport { status, .. } => {
                WeatherError::Transport { message: message.into(), status }
            }
            WeatherError::Timeout { .. } => WeatherError::Timeout { message: message.into() },
            other => other,
        }
    }

    /// Message to show the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::timeout()
        } else if err.is_decode() {
            WeatherError::DataShape(err.to_string())
        } else {
            WeatherError::Transport {
                message: format!("Network error: {err}"),
                status: err.status().map(|s| s.as_u16()),
            }
        }
    }
}
