//! Query building and time-bounded JSON requests.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};
use url::Url;

use crate::error::WeatherError;

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

/// Ordered query parameters. List values are joined with commas, the way
/// Open-Meteo expects its variable lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any earlier value.
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    /// Skips the parameter entirely when `value` is `None`.
    pub fn set_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn set_list(self, key: &str, values: &[&str]) -> Self {
        self.set(key, values.join(","))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub fn build_url(base: &str, params: &QueryParams) -> Result<Url, WeatherError> {
    let mut url = Url::parse(base)
        .map_err(|e| WeatherError::Validation(format!("Invalid endpoint URL '{base}': {e}")))?;

    if params.pairs.is_empty() {
        return Ok(url);
    }

    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params.iter() {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Performs a GET and decodes the JSON body, giving up after `timeout`.
#[async_trait]
pub trait JsonFetcher: Send + Sync + Debug {
    async fn get_json(&self, url: &Url, timeout: Duration) -> Result<Value, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, WeatherError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, url: &Url) -> Result<Value, WeatherError> {
        let res = self.http.get(url.clone()).send().await?;

        let status = res.status();
        if !status.is_success() {
            let message = match status.canonical_reason() {
                Some(reason) => format!("HTTP Error: {} {}", status.as_u16(), reason),
                None => format!("HTTP Error: {}", status.as_u16()),
            };
            return Err(WeatherError::Transport { message, status: Some(status.as_u16()) });
        }

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| WeatherError::DataShape(e.to_string()))
    }
}

#[async_trait]
impl JsonFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &Url, timeout: Duration) -> Result<Value, WeatherError> {
        tracing::debug!(%url, ?timeout, "GET");

        // The deadline covers reading the body too.
        match tokio::time::timeout(timeout, self.fetch(url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(%url, "request deadline expired");
                Err(WeatherError::timeout())
            }
        }
    }
}
