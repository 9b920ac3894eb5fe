use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{Query, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// WeatherAPI.com over plain HTTP GET.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn fetch(&self, query: &Query) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, query.endpoint());
        let mut params = vec![("key", self.api_key.clone())];
        params.extend(query.params());

        tracing::debug!(endpoint = query.endpoint(), "sending WeatherAPI request");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to WeatherAPI.com ({})", query.endpoint())
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| {
                format!("Failed to read WeatherAPI {} response body", query.endpoint())
            })?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI {} request failed with status {}: {}",
                query.endpoint(),
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {} JSON", query.endpoint()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
