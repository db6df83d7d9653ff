//! Persistent key-value storage for preferences and the last location.
//!
//! Values are JSON-encoded strings. Reads never fail from the caller's point
//! of view: a missing, unreadable or undecodable value yields the supplied
//! default.

use anyhow::anyhow;
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::WeatherError;

pub const PREFERRED_UNIT_KEY: &str = "weather_app_preferred_unit";
pub const LAST_LOCATION_KEY: &str = "weather_app_last_location";
pub const LAST_UPDATE_KEY: &str = "last_weather_update";

/// What the user looked at last, so the next start can pick up from there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LastLocation {
    City { name: String },
    Coordinates { latitude: f64, longitude: f64 },
}

pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError>;
    fn set(&self, key: &str, value: String) -> Result<(), WeatherError>;
    fn remove(&self, key: &str) -> Result<(), WeatherError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), WeatherError> {
        self.items.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), WeatherError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file starts empty; so does a
    /// corrupt one, which is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WeatherError> {
        let path = path.as_ref().to_path_buf();

        let items = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                WeatherError::Storage(format!("Failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable store");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, items: Mutex::new(items) })
    }

    /// `state.json` in the platform data directory.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo", "meteo")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WeatherError::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(items)
            .map_err(|e| WeatherError::Storage(format!("Failed to encode store: {e}")))?;

        fs::write(&self.path, json).map_err(|e| {
            WeatherError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), WeatherError> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value);
        self.persist(&items)
    }

    fn remove(&self, key: &str) -> Result<(), WeatherError> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.persist(&items)?;
        }
        Ok(())
    }
}

/// JSON coding on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct JsonStore {
    inner: Arc<dyn KeyValueStore>,
}

impl JsonStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Decoded value, or `None` if missing or unreadable.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.inner.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(key, error = %e, "error reading from store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key, error = %e, "error decoding stored value");
                None
            }
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), WeatherError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| WeatherError::Storage(format!("Failed to encode '{key}': {e}")))?;
        self.inner.set(key, raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), WeatherError> {
        self.inner.remove(key)
    }
}
