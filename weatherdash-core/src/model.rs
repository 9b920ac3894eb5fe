//! Fixed internal schema the normalizer produces.
//!
//! Every numeric leaf defaults to `NaN` and every string leaf to `""`, so a
//! freshly built value doubles as the "nothing known" template.

use serde::{Deserialize, Serialize};

use crate::{diagnostics::Diagnostics, location::Location};

/// Hour slots every forecast day carries.
pub const HOURS_PER_DAY: usize = 24;

/// Which weather endpoint a fetch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Current,
    Forecast,
}

impl WeatherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherKind::Current => "current",
            WeatherKind::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized payload together with the fields that had to be defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub data: T,
    pub diagnostics: Diagnostics,
}

impl<T> Normalized<T> {
    pub fn new(data: T, diagnostics: Diagnostics) -> Self {
        Self { data, diagnostics }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: f64,
}

impl Default for Condition {
    fn default() -> Self {
        Self { text: String::new(), icon: String::new(), code: f64::NAN }
    }
}

impl Condition {
    pub fn is_unset(&self) -> bool {
        self.text.is_empty() && self.icon.is_empty() && self.code.is_nan()
    }

    /// Provider condition code, if it was present and integral.
    pub fn code(&self) -> Option<i64> {
        (self.code.is_finite() && self.code.fract() == 0.0).then_some(self.code as i64)
    }
}

/// Conditions at the time of the last provider update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub is_day: f64,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
}

impl Default for Current {
    fn default() -> Self {
        Self {
            last_updated: String::new(),
            temp_c: f64::NAN,
            temp_f: f64::NAN,
            is_day: f64::NAN,
            condition: Condition::default(),
            wind_mph: f64::NAN,
            wind_kph: f64::NAN,
        }
    }
}

/// Whole-day aggregates of one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub max_temp_c: f64,
    pub max_temp_f: f64,
    pub min_temp_c: f64,
    pub min_temp_f: f64,
    pub avg_temp_c: f64,
    pub avg_temp_f: f64,
    pub max_wind_mph: f64,
    pub max_wind_kph: f64,
    pub will_rain: f64,
    pub chance_of_rain: f64,
    pub will_snow: f64,
    pub chance_of_snow: f64,
    pub condition: Condition,
}

impl Default for DaySummary {
    fn default() -> Self {
        Self {
            max_temp_c: f64::NAN,
            max_temp_f: f64::NAN,
            min_temp_c: f64::NAN,
            min_temp_f: f64::NAN,
            avg_temp_c: f64::NAN,
            avg_temp_f: f64::NAN,
            max_wind_mph: f64::NAN,
            max_wind_kph: f64::NAN,
            will_rain: f64::NAN,
            chance_of_rain: f64::NAN,
            will_snow: f64::NAN,
            chance_of_snow: f64::NAN,
            condition: Condition::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastHour {
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub humidity: f64,
    pub will_rain: f64,
    pub chance_of_rain: f64,
    pub will_snow: f64,
    pub chance_of_snow: f64,
}

impl Default for ForecastHour {
    fn default() -> Self {
        Self::empty()
    }
}

impl ForecastHour {
    pub fn empty() -> Self {
        Self {
            time: String::new(),
            temp_c: f64::NAN,
            temp_f: f64::NAN,
            condition: Condition::default(),
            wind_mph: f64::NAN,
            wind_kph: f64::NAN,
            humidity: f64::NAN,
            will_rain: f64::NAN,
            chance_of_rain: f64::NAN,
            will_snow: f64::NAN,
            chance_of_snow: f64::NAN,
        }
    }

    /// True when nothing was copied into this slot. `NaN` never compares
    /// equal, so this replaces `== ForecastHour::empty()`.
    pub fn is_unset(&self) -> bool {
        self.time.is_empty()
            && self.condition.is_unset()
            && [
                self.temp_c,
                self.temp_f,
                self.wind_mph,
                self.wind_kph,
                self.humidity,
                self.will_rain,
                self.chance_of_rain,
                self.will_snow,
                self.chance_of_snow,
            ]
            .iter()
            .all(|n| n.is_nan())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
    pub hours: Vec<ForecastHour>,
}

impl ForecastDay {
    /// Day template without any hour slots.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Day template with all 24 sentinel hours already in place.
    pub fn placeholder() -> Self {
        Self { hours: vec![ForecastHour::empty(); HOURS_PER_DAY], ..Self::empty() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub days: Vec<ForecastDay>,
}

/// Location, current conditions and (for forecast queries) the daily forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub local_time: String,
    pub current: Current,
    pub forecast: Forecast,
}

impl WeatherReport {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Today's forecast, which also carries the hourly breakdown.
    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast.days.first()
    }

    /// Forecast days after today.
    pub fn upcoming(&self) -> &[ForecastDay] {
        self.forecast.days.get(1..).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_uses_sentinels() {
        let report = WeatherReport::empty();

        assert!(report.location.is_empty());
        assert_eq!(report.current.last_updated, "");
        assert!(report.current.temp_c.is_nan());
        assert!(report.current.condition.code.is_nan());
        assert!(report.forecast.days.is_empty());
        assert!(report.today().is_none());
        assert!(report.upcoming().is_empty());
    }

    #[test]
    fn placeholder_day_has_full_hours() {
        let day = ForecastDay::placeholder();

        assert_eq!(day.hours.len(), HOURS_PER_DAY);
        assert!(day.hours.iter().all(ForecastHour::is_unset));
        assert!(ForecastDay::empty().hours.is_empty());
    }

    #[test]
    fn condition_code_requires_integral_value() {
        let mut cond = Condition::default();
        assert_eq!(cond.code(), None);

        assert!(cond.is_unset());

        cond.code = 1183.0;
        assert!(!cond.is_unset());
        assert_eq!(cond.code(), Some(1183));

        cond.code = 12.5;
        assert_eq!(cond.code(), None);
    }

    #[test]
    fn upcoming_skips_today() {
        let mut report = WeatherReport::empty();
        report.forecast.days = vec![ForecastDay::placeholder(), ForecastDay::placeholder()];

        assert_eq!(report.upcoming().len(), 1);
    }
}
