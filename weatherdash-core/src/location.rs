use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Query value WeatherAPI.com resolves to the caller's own location.
pub const AUTO_IP: &str = "auto:ip";

/// Country name left out of display strings.
pub const HOME_COUNTRY: &str = "United States of America";

/// A place as returned by the provider's search endpoint.
///
/// An empty `name` means the location is unset and the provider should
/// detect it from the caller's IP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), region: region.into(), country: country.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Human-readable form, e.g. `"Yarmouth, Maine"` or `"Paris, France"`.
    /// The country is always appended unless it is the home country, even
    /// when empty.
    pub fn display_string(&self) -> String {
        let mut out = self.name.clone();
        if !self.region.is_empty() {
            out.push_str(", ");
            out.push_str(&self.region);
        }
        if self.country != HOME_COUNTRY {
            out.push_str(", ");
            out.push_str(&self.country);
        }
        out
    }

    /// Value for the provider's `q` parameter.
    pub fn search_string(&self) -> String {
        if self.is_empty() {
            return AUTO_IP.to_string();
        }

        [&self.name, &self.region, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Copy fields from a raw provider object.
    ///
    /// Returns `true` when the required `name` was missing or not a string.
    /// `region` and `country` are optional: when absent they become empty
    /// without being reported.
    pub fn update_from_source(&mut self, source: &Value) -> bool {
        let mut error_found = false;

        match source.get("name").and_then(Value::as_str) {
            Some(name) => self.name = name.to_string(),
            None => error_found = true,
        }

        self.region = optional_str(source, "region");
        self.country = optional_str(source, "country");

        error_found
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

fn optional_str(source: &Value, key: &str) -> String {
    source.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn home_country_is_suppressed() {
        let loc = Location::new("Yarmouth", "Maine", "United States of America");
        assert_eq!(loc.display_string(), "Yarmouth, Maine");
    }

    #[test]
    fn empty_region_is_skipped() {
        let loc = Location::new("Paris", "", "France");
        assert_eq!(loc.display_string(), "Paris, France");
        assert_eq!(loc.to_string(), "Paris, France");
    }

    #[test]
    fn empty_country_keeps_separator() {
        assert_eq!(Location::new("Paris", "", "").display_string(), "Paris, ");
        assert_eq!(Location::default().display_string(), ", ");
    }

    #[test]
    fn empty_location_searches_by_ip() {
        let loc = Location::default();
        assert!(loc.is_empty());
        assert_eq!(loc.search_string(), "auto:ip");
    }

    #[test]
    fn search_string_keeps_home_country() {
        let loc = Location::new("Yarmouth", "Maine", "United States of America");
        assert_eq!(loc.search_string(), "Yarmouth, Maine, United States of America");

        let loc = Location::new("Paris", "", "France");
        assert_eq!(loc.search_string(), "Paris, France");
    }

    #[test]
    fn update_from_source_copies_fields() {
        let mut loc = Location::default();
        let err = loc.update_from_source(&json!({
            "id": 2801268,
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
        }));

        assert!(!err);
        assert_eq!(
            loc,
            Location::new("London", "City of London, Greater London", "United Kingdom")
        );
    }

    #[test]
    fn update_from_source_requires_name_only() {
        let mut loc = Location::new("Old", "Old region", "Old country");
        let err = loc.update_from_source(&json!({ "region": "Maine" }));

        assert!(err);
        assert_eq!(loc.name, "Old");
        assert_eq!(loc.region, "Maine");
        assert_eq!(loc.country, "");
    }

    #[test]
    fn update_from_non_object_reports_error() {
        let mut loc = Location::default();
        assert!(loc.update_from_source(&json!(42)));
        assert!(loc.is_empty());
    }
}
