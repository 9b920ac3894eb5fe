use crate::{
    Config,
    model::WeatherKind,
    source::{fixture::FixtureSource, weatherapi::WeatherApiClient},
};
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};

pub mod fixture;
pub mod weatherapi;

/// One request against the weather provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Current conditions for a location search string.
    Current { location: String },
    /// Current conditions plus `days` days of forecast (today included).
    Forecast { location: String, days: u32 },
    /// Free-text location lookup.
    Search { text: String },
}

impl Query {
    pub fn weather(kind: WeatherKind, location: impl Into<String>, forecast_days: u32) -> Self {
        let location = location.into();
        match kind {
            WeatherKind::Current => Query::Current { location },
            WeatherKind::Forecast => {
                Query::Forecast { location, days: forecast_days.saturating_add(1) }
            }
        }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Query::Search { text: text.into() }
    }

    /// Endpoint file name under the provider's base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Query::Current { .. } => "current.json",
            Query::Forecast { .. } => "forecast.json",
            Query::Search { .. } => "search.json",
        }
    }

    /// Query-string parameters, without the API key.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Query::Current { location } => {
                vec![("q", location.clone()), ("aqi", "no".to_string())]
            }
            Query::Forecast { location, days } => vec![
                ("q", location.clone()),
                ("days", days.to_string()),
                ("aqi", "no".to_string()),
            ],
            Query::Search { text } => vec![("q", text.clone())],
        }
    }
}

/// Generic GET against the weather provider. Implementations return the raw
/// JSON body; shaping it is the normalizer's job.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, query: &Query) -> anyhow::Result<Value>;
}

/// Build the live WeatherAPI.com source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherSource>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for WeatherAPI.com.\n\
                 Hint: run `weatherdash configure` and enter your API key, \
                 or pass `--offline` to use sample data."
        )
    })?;

    let client = match config.base_url.as_deref() {
        Some(base) => WeatherApiClient::with_base_url(api_key.to_owned(), base),
        None => WeatherApiClient::new(api_key.to_owned()),
    };

    Ok(Arc::new(client))
}

/// Live source, or canned sample data when `offline` is set.
pub fn select_source(config: &Config, offline: bool) -> anyhow::Result<Arc<dyn WeatherSource>> {
    if offline {
        tracing::info!("using offline sample data");
        return Ok(Arc::new(FixtureSource::new()));
    }
    source_from_config(config)
}
