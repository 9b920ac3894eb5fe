//! Reshapes untrusted provider JSON into the fixed schema in [`crate::model`].
//!
//! Each schema type lists the keys it expects through [`Fill`]. A key is
//! copied when it is present with the expected JSON type; otherwise its path
//! is recorded and the sentinel default stays in place. A missing parent
//! object is recorded once and nothing underneath it is visited.
//!
//! Normalization never fails: every outcome is a value plus diagnostics.

use serde_json::{Map, Value};

use crate::{
    diagnostics::Diagnostics,
    location::Location,
    model::{
        Condition, Current, DaySummary, ForecastDay, ForecastHour, HOURS_PER_DAY, Normalized,
        WeatherKind, WeatherReport,
    },
};

pub const IMPROPER_FORECAST: &str = "Improperly Formatted Forecast Data.";
pub const NO_CITIES: &str = "No Cities Found.";
pub const IMPROPER_SEARCH: &str = "Query Response improperly formatted.";
pub const SEARCH_RESULT_ERROR: &str = "Error in a Search Result Formatting.";

/// Cursor over one JSON object that copies expected keys into a target and
/// records the path of every key it could not copy.
pub(crate) struct Fields<'a, 'm> {
    source: &'a Map<String, Value>,
    prefix: String,
    missing: &'m mut Vec<String>,
}

impl<'a, 'm> Fields<'a, 'm> {
    fn root(source: &'a Map<String, Value>, missing: &'m mut Vec<String>) -> Self {
        Self { source, prefix: String::new(), missing }
    }

    fn report(&mut self, key: &str) {
        self.missing.push(format!("{}{key}", self.prefix));
    }

    pub(crate) fn text(&mut self, key: &str, slot: &mut String) {
        match self.source.get(key) {
            Some(Value::String(s)) => slot.clone_from(s),
            _ => self.report(key),
        }
    }

    pub(crate) fn number(&mut self, key: &str, slot: &mut f64) {
        match self.source.get(key).and_then(Value::as_f64) {
            Some(n) => *slot = n,
            None => self.report(key),
        }
    }

    /// Child cursor for a nested object, or `None` (already reported) when
    /// the key is absent or not an object.
    pub(crate) fn object(&mut self, key: &str) -> Option<Fields<'a, '_>> {
        match self.source.get(key).and_then(Value::as_object) {
            Some(source) => Some(Fields {
                source,
                prefix: format!("{}{key}.", self.prefix),
                missing: &mut *self.missing,
            }),
            None => {
                self.report(key);
                None
            }
        }
    }

    pub(crate) fn nested<T: Fill>(&mut self, key: &str, target: &mut T) {
        if let Some(mut child) = self.object(key) {
            target.fill(&mut child);
        }
    }
}

/// Schema types that know which provider keys feed them.
pub(crate) trait Fill {
    fn fill(&mut self, fields: &mut Fields<'_, '_>);
}

/// Copy `source` into `target`; returns the relative paths that were missing.
pub(crate) fn fill_from<T: Fill>(target: &mut T, source: &Map<String, Value>) -> Vec<String> {
    let mut missing = Vec::new();
    target.fill(&mut Fields::root(source, &mut missing));
    missing
}

impl Fill for Condition {
    fn fill(&mut self, f: &mut Fields<'_, '_>) {
        f.text("text", &mut self.text);
        f.text("icon", &mut self.icon);
        f.number("code", &mut self.code);
    }
}

impl Fill for Current {
    fn fill(&mut self, f: &mut Fields<'_, '_>) {
        f.text("last_updated", &mut self.last_updated);
        f.number("temp_c", &mut self.temp_c);
        f.number("temp_f", &mut self.temp_f);
        f.number("is_day", &mut self.is_day);
        f.number("wind_mph", &mut self.wind_mph);
        f.number("wind_kph", &mut self.wind_kph);
        f.nested("condition", &mut self.condition);
    }
}

/// Location and current conditions; the forecast section is handled apart.
impl Fill for WeatherReport {
    fn fill(&mut self, f: &mut Fields<'_, '_>) {
        if let Some(mut loc) = f.object("location") {
            loc.text("name", &mut self.location.name);
            loc.text("region", &mut self.location.region);
            loc.text("country", &mut self.location.country);
            loc.text("localtime", &mut self.local_time);
        }
        f.nested("current", &mut self.current);
    }
}

impl Fill for DaySummary {
    fn fill(&mut self, f: &mut Fields<'_, '_>) {
        f.number("maxtemp_c", &mut self.max_temp_c);
        f.number("maxtemp_f", &mut self.max_temp_f);
        f.number("mintemp_c", &mut self.min_temp_c);
        f.number("mintemp_f", &mut self.min_temp_f);
        f.number("avgtemp_c", &mut self.avg_temp_c);
        f.number("avgtemp_f", &mut self.avg_temp_f);
        f.number("maxwind_mph", &mut self.max_wind_mph);
        f.number("maxwind_kph", &mut self.max_wind_kph);
        f.number("daily_will_it_rain", &mut self.will_rain);
        f.number("daily_chance_of_rain", &mut self.chance_of_rain);
        f.number("daily_will_it_snow", &mut self.will_snow);
        f.number("daily_chance_of_snow", &mut self.chance_of_snow);
        f.nested("condition", &mut self.condition);
    }
}

impl Fill for ForecastHour {
    fn fill(&mut self, f: &mut Fields<'_, '_>) {
        f.text("time", &mut self.time);
        f.number("temp_c", &mut self.temp_c);
        f.number("temp_f", &mut self.temp_f);
        f.nested("condition", &mut self.condition);
        f.number("wind_mph", &mut self.wind_mph);
        f.number("wind_kph", &mut self.wind_kph);
        f.number("humidity", &mut self.humidity);
        f.number("will_it_rain", &mut self.will_rain);
        f.number("chance_of_rain", &mut self.chance_of_rain);
        f.number("will_it_snow", &mut self.will_snow);
        f.number("chance_of_snow", &mut self.chance_of_snow);
    }
}

/// Turns provider payloads into [`Normalized`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseNormalizer {
    forecast_days: u32,
}

impl ResponseNormalizer {
    /// `forecast_days` counts days after today; responses are expected to
    /// carry `forecast_days + 1` days.
    pub fn new(forecast_days: u32) -> Self {
        Self { forecast_days }
    }

    pub fn forecast_days(&self) -> u32 {
        self.forecast_days
    }

    pub fn expected_days(&self) -> usize {
        (self.forecast_days as usize).saturating_add(1)
    }

    pub fn weather(&self, response: &Value, kind: WeatherKind) -> Normalized<WeatherReport> {
        let empty = Map::new();
        let root = response.as_object().unwrap_or(&empty);

        let mut report = WeatherReport::empty();
        let mut diagnostics: Diagnostics = fill_from(&mut report, root).into();

        if kind == WeatherKind::Forecast {
            self.add_forecast(root, &mut report, &mut diagnostics);
        }

        Normalized::new(report, diagnostics)
    }

    fn add_forecast(
        &self,
        root: &Map<String, Value>,
        report: &mut WeatherReport,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(days) = root
            .get("forecast")
            .and_then(|f| f.get("forecastday"))
            .and_then(Value::as_array)
        else {
            diagnostics.push(IMPROPER_FORECAST);
            return;
        };

        let expected = self.expected_days();
        if days.len() < expected {
            diagnostics.push(format!("Missing {} forecast days of data.", expected - days.len()));
        } else if days.len() > expected {
            tracing::debug!(
                received = days.len(),
                expected,
                "dropping forecast days beyond the requested range"
            );
        }

        report.forecast.days = days
            .iter()
            .take(expected)
            .enumerate()
            .map(|(index, source)| normalize_day(index, source, diagnostics))
            .collect();
    }

    pub fn search(&self, response: &Value) -> Normalized<Vec<Location>> {
        let mut diagnostics = Diagnostics::new();
        let mut locations = Vec::new();

        match response.as_array() {
            Some(results) if results.is_empty() => diagnostics.push(NO_CITIES),
            Some(results) => {
                let mut formatting_error = false;
                for result in results {
                    let mut location = Location::default();
                    formatting_error |= location.update_from_source(result);
                    locations.push(location);
                }
                if formatting_error {
                    diagnostics.push(SEARCH_RESULT_ERROR);
                }
            }
            None => diagnostics.push(IMPROPER_SEARCH),
        }

        Normalized::new(locations, diagnostics)
    }
}

fn normalize_day(index: usize, source: &Value, diagnostics: &mut Diagnostics) -> ForecastDay {
    let empty = Map::new();
    let source = source.as_object().unwrap_or(&empty);

    let mut day = ForecastDay::empty();
    {
        let mut missing = Vec::new();
        let mut f = Fields::root(source, &mut missing);
        f.text("date", &mut day.date);
        f.nested("day", &mut day.day);

        for path in missing {
            let what = match path.as_str() {
                "day" => "data",
                other => other.strip_prefix("day.").unwrap_or(other),
            };
            diagnostics.push(format!("Forecast of day {index} is missing {what}."));
        }
    }

    let source_hours = source.get("hour").and_then(Value::as_array);
    let mut hour_gap = source_hours.is_none();

    day.hours = (0..HOURS_PER_DAY)
        .map(|h| {
            let mut hour = ForecastHour::empty();
            match source_hours.and_then(|hours| hours.get(h)).map(Value::as_object) {
                Some(Some(obj)) => hour_gap |= !fill_from(&mut hour, obj).is_empty(),
                _ => hour_gap = true,
            }
            hour
        })
        .collect();

    if hour_gap {
        diagnostics.push(format!("Forecast of day {index} is missing hour data."));
    }

    day
}
