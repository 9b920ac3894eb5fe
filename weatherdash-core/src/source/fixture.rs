//! Canned provider payloads for offline use and tests.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Query, WeatherSource};

/// Serves sample data shaped like WeatherAPI.com responses.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource;

impl FixtureSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WeatherSource for FixtureSource {
    async fn fetch(&self, query: &Query) -> Result<Value> {
        Ok(match query {
            Query::Current { .. } => {
                let mut body = sample_forecast(0);
                if let Some(obj) = body.as_object_mut() {
                    obj.remove("forecast");
                }
                body
            }
            Query::Forecast { days, .. } => sample_forecast(days.saturating_sub(1)),
            Query::Search { text } => sample_search(text),
        })
    }
}

/// Forecast response covering today plus `forecast_days` more days.
pub fn sample_forecast(forecast_days: u32) -> Value {
    let days: Vec<Value> = (0..=forecast_days)
        .map(|i| sample_day(&format!("2023-09-{:02}", i + 1)))
        .collect();

    json!({
        "location": {
            "name": "Yarmouth",
            "region": "Maine",
            "country": "United States of America",
            "lat": 43.8,
            "lon": -70.19,
            "tz_id": "America/New_York",
            "localtime_epoch": 1694386898,
            "localtime": "2023-09-01 19:01"
        },
        "current": {
            "last_updated_epoch": 1694386800,
            "last_updated": "2023-09-01 19:00",
            "temp_c": 18.3,
            "temp_f": 64.9,
            "is_day": 0,
            "condition": {
                "text": "Light rain",
                "icon": "//cdn.weatherapi.com/weather/64x64/night/296.png",
                "code": 1183
            },
            "wind_mph": 2.2,
            "wind_kph": 3.6,
            "wind_degree": 10,
            "wind_dir": "N",
            "pressure_mb": 1020,
            "humidity": 100,
            "cloud": 100,
            "feelslike_c": 18.3,
            "feelslike_f": 64.9
        },
        "forecast": { "forecastday": days }
    })
}

fn sample_day(date: &str) -> Value {
    let hours: Vec<Value> = (0..24).map(|h| sample_hour(date, h)).collect();

    json!({
        "date": date,
        "date_epoch": 1694476800,
        "day": {
            "maxtemp_c": 19.8,
            "maxtemp_f": 67.6,
            "mintemp_c": 15.5,
            "mintemp_f": 59.9,
            "avgtemp_c": 17.3,
            "avgtemp_f": 63.1,
            "maxwind_mph": 8.9,
            "maxwind_kph": 14.4,
            "totalprecip_mm": 1,
            "avghumidity": 93,
            "daily_will_it_rain": 1,
            "daily_chance_of_rain": 86,
            "daily_will_it_snow": 0,
            "daily_chance_of_snow": 0,
            "condition": {
                "text": "Patchy rain possible",
                "icon": "//cdn.weatherapi.com/weather/64x64/day/176.png",
                "code": 1063
            },
            "uv": 4
        },
        "hour": hours
    })
}

fn sample_hour(date: &str, hour: u32) -> Value {
    let temp_c = 15.5 + f64::from(hour % 12) * 0.35;
    json!({
        "time": format!("{date} {hour:02}:00"),
        "temp_c": temp_c,
        "temp_f": temp_c * 9.0 / 5.0 + 32.0,
        "is_day": u8::from((6..20).contains(&hour)),
        "condition": {
            "text": "Overcast",
            "icon": "//cdn.weatherapi.com/weather/64x64/night/122.png",
            "code": 1009
        },
        "wind_mph": 4.3,
        "wind_kph": 6.8,
        "humidity": 90,
        "will_it_rain": u8::from(hour >= 12),
        "chance_of_rain": if hour >= 12 { 74 } else { 12 },
        "will_it_snow": 0,
        "chance_of_snow": 0
    })
}

/// Search response: sample places whose name starts with `text`
/// (case-insensitive).
pub fn sample_search(text: &str) -> Value {
    const PLACES: &[(&str, &str, &str)] = &[
        ("Yarmouth", "Maine", "United States of America"),
        ("Yarmouth", "Nova Scotia", "Canada"),
        ("Great Yarmouth", "Norfolk", "United Kingdom"),
        ("Paris", "Ile-de-France", "France"),
        ("Paris", "Texas", "United States of America"),
        ("Portland", "Maine", "United States of America"),
        ("Portland", "Oregon", "United States of America"),
    ];

    let needle = text.trim().to_lowercase();
    let results: Vec<Value> = PLACES
        .iter()
        .filter(|(name, _, _)| {
            name.to_lowercase().split_whitespace().any(|w| w.starts_with(&needle))
        })
        .enumerate()
        .map(|(id, (name, region, country))| {
            json!({ "id": id, "name": name, "region": region, "country": country })
        })
        .collect();

    Value::Array(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_forecast_has_requested_days() {
        let body = sample_forecast(2);
        let days = body["forecast"]["forecastday"].as_array().unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[2]["date"], "2023-09-03");
        assert_eq!(days[0]["hour"].as_array().unwrap().len(), 24);
        assert_eq!(days[0]["hour"][7]["time"], "2023-09-01 07:00");
    }

    #[test]
    fn sample_search_matches_word_prefix() {
        assert_eq!(sample_search("yarm").as_array().unwrap().len(), 3);
        assert_eq!(sample_search("Paris").as_array().unwrap().len(), 2);
        assert!(sample_search("zzz").as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn current_query_has_no_forecast() {
        let body = FixtureSource::new()
            .fetch(&Query::Current { location: "auto:ip".into() })
            .await
            .unwrap();

        assert!(body.get("forecast").is_none());
        assert_eq!(body["current"]["condition"]["code"], 1183);
    }

    #[tokio::test]
    async fn forecast_query_counts_today() {
        let body = FixtureSource::new()
            .fetch(&Query::Forecast { location: "auto:ip".into(), days: 4 })
            .await
            .unwrap();

        assert_eq!(body["forecast"]["forecastday"].as_array().unwrap().len(), 4);
    }
}
