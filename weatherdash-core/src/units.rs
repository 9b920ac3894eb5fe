//! Display-time unit selection and rounding.
//!
//! The normalized data keeps both unit systems; these helpers pick one and
//! round it the way the dashboard shows it. Unknown (`NaN`) values come back
//! as `None`.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Current, DaySummary, ForecastHour};

/// Unit preference. Fahrenheit pairs with mph, Celsius with kph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
        }
    }

    pub fn temp_suffix(self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Celsius => "°C",
        }
    }

    pub fn wind_suffix(self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "mph",
            TemperatureUnit::Celsius => "kph",
        }
    }

    fn pick(self, f: f64, c: f64) -> f64 {
        match self {
            TemperatureUnit::Fahrenheit => f,
            TemperatureUnit::Celsius => c,
        }
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "f" | "fahrenheit" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            "c" | "celsius" | "metric" => Ok(TemperatureUnit::Celsius),
            _ => Err(anyhow::anyhow!("Unknown unit '{value}'. Supported units: f, c.")),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Fahrenheit => write!(f, "Fahrenheit ({})", self.temp_suffix()),
            TemperatureUnit::Celsius => write!(f, "Celsius ({})", self.temp_suffix()),
        }
    }
}

fn whole(value: f64) -> Option<i64> {
    value.is_finite().then_some(value as i64)
}

/// Daily high, rounded up.
pub fn daily_high(day: &DaySummary, unit: TemperatureUnit) -> Option<i64> {
    whole(unit.pick(day.max_temp_f, day.max_temp_c).ceil())
}

/// Daily low, rounded down.
pub fn daily_low(day: &DaySummary, unit: TemperatureUnit) -> Option<i64> {
    whole(unit.pick(day.min_temp_f, day.min_temp_c).floor())
}

pub fn current_temp(current: &Current, unit: TemperatureUnit) -> Option<i64> {
    whole(unit.pick(current.temp_f, current.temp_c).round())
}

pub fn hour_temp(hour: &ForecastHour, unit: TemperatureUnit) -> Option<i64> {
    whole(unit.pick(hour.temp_f, hour.temp_c).round())
}

pub fn hour_wind(hour: &ForecastHour, unit: TemperatureUnit) -> Option<i64> {
    whole(unit.pick(hour.wind_mph, hour.wind_kph).round())
}

pub fn current_wind(current: &Current, unit: TemperatureUnit) -> Option<i64> {
    whole(unit.pick(current.wind_mph, current.wind_kph).round())
}

/// Larger of the rounded rain and snow chances.
fn precipitation(rain: f64, snow: f64) -> Option<i64> {
    match (whole(rain.round()), whole(snow.round())) {
        (Some(r), Some(s)) => Some(r.max(s)),
        _ => None,
    }
}

pub fn daily_precipitation(day: &DaySummary) -> Option<i64> {
    precipitation(day.chance_of_rain, day.chance_of_snow)
}

pub fn hour_precipitation(hour: &ForecastHour) -> Option<i64> {
    precipitation(hour.chance_of_rain, hour.chance_of_snow)
}

/// `"--"` for unknown values.
pub fn show(value: Option<i64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| v.to_string())
}

/// Weekday name for `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
pub fn weekday_label(date: &str, abbreviated: bool) -> Option<String> {
    let day = date.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;
    let name = match day.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    Some(if abbreviated { name[..3].to_string() } else { name.to_string() })
}

/// `HH:MM` tail of a provider timestamp.
pub fn hour_label(time: &str) -> &str {
    let start = time.char_indices().rev().nth(4).map_or(0, |(i, _)| i);
    &time[start..]
}

/// Broad sky category used to tint the current-conditions panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sky {
    Clear,
    Cloudy,
    Other,
}

pub fn sky_for(code: Option<i64>) -> Sky {
    match code {
        Some(1000) => Sky::Clear,
        Some(1003 | 1006 | 1009) => Sky::Cloudy,
        _ => Sky::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(max: f64, min: f64) -> DaySummary {
        DaySummary {
            max_temp_f: max,
            max_temp_c: (max - 32.0) * 5.0 / 9.0,
            min_temp_f: min,
            min_temp_c: (min - 32.0) * 5.0 / 9.0,
            ..DaySummary::default()
        }
    }

    #[test]
    fn daily_extremes_round_outward() {
        let d = day(67.2, 59.9);

        assert_eq!(daily_high(&d, TemperatureUnit::Fahrenheit), Some(68));
        assert_eq!(daily_low(&d, TemperatureUnit::Fahrenheit), Some(59));
        assert_eq!(daily_high(&d, TemperatureUnit::Celsius), Some(20));
        assert_eq!(daily_low(&d, TemperatureUnit::Celsius), Some(15));
    }

    #[test]
    fn momentary_values_round_to_nearest() {
        let mut h = ForecastHour::empty();
        h.temp_f = 64.5;
        h.temp_c = 18.3;
        h.wind_mph = 2.2;
        h.wind_kph = 3.6;

        assert_eq!(hour_temp(&h, TemperatureUnit::Fahrenheit), Some(65));
        assert_eq!(hour_temp(&h, TemperatureUnit::Celsius), Some(18));
        assert_eq!(hour_wind(&h, TemperatureUnit::Fahrenheit), Some(2));
        assert_eq!(hour_wind(&h, TemperatureUnit::Celsius), Some(4));
    }

    #[test]
    fn unknown_values_render_as_dashes() {
        let h = ForecastHour::empty();
        assert_eq!(hour_temp(&h, TemperatureUnit::Celsius), None);
        assert_eq!(show(hour_temp(&h, TemperatureUnit::Celsius)), "--");
        assert_eq!(show(Some(-3)), "-3");
    }

    #[test]
    fn precipitation_takes_larger_chance() {
        let mut d = DaySummary {
            chance_of_rain: 20.4,
            chance_of_snow: 61.5,
            ..DaySummary::default()
        };
        assert_eq!(daily_precipitation(&d), Some(62));

        d.chance_of_snow = f64::NAN;
        assert_eq!(daily_precipitation(&d), None);
    }

    #[test]
    fn toggle_and_suffixes() {
        let unit = TemperatureUnit::default();
        assert_eq!(unit.temp_suffix(), "°F");
        assert_eq!(unit.wind_suffix(), "mph");

        let unit = unit.toggle();
        assert_eq!(unit, TemperatureUnit::Celsius);
        assert_eq!(unit.temp_suffix(), "°C");
        assert_eq!(unit.wind_suffix(), "kph");
    }

    #[test]
    fn parse_unit_names() {
        assert_eq!(TemperatureUnit::try_from("C").unwrap(), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::try_from("fahrenheit").unwrap(), TemperatureUnit::Fahrenheit);
        assert!(TemperatureUnit::try_from("kelvin").is_err());
    }

    #[test]
    fn weekday_and_hour_labels() {
        assert_eq!(weekday_label("2023-09-01", false).as_deref(), Some("Friday"));
        assert_eq!(weekday_label("2023-09-03 13:00", true).as_deref(), Some("Sun"));
        assert_eq!(weekday_label("", true), None);

        assert_eq!(hour_label("2023-09-01 13:00"), "13:00");
        assert_eq!(hour_label("9:00"), "9:00");
    }

    #[test]
    fn sky_categories() {
        assert_eq!(sky_for(Some(1000)), Sky::Clear);
        assert_eq!(sky_for(Some(1006)), Sky::Cloudy);
        assert_eq!(sky_for(Some(1183)), Sky::Other);
        assert_eq!(sky_for(None), Sky::Other);
    }
}
