use crate::{
    diagnostics::Diagnostics,
    location::Location,
    model::{Normalized, WeatherReport},
    units::TemperatureUnit,
};

/// Everything the view needs between requests: the unit preference, the
/// location being shown, and the last report that loaded successfully.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    unit: TemperatureUnit,
    location: Location,
    last: Option<Normalized<WeatherReport>>,
}

impl AppState {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self { unit, ..Self::default() }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggle();
        self.unit
    }

    /// Location to query next. Empty means "detect from IP".
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn select_location(&mut self, location: Location) {
        self.location = location;
    }

    /// Store a freshly loaded report, replacing the previous one. The shown
    /// location follows what the provider resolved.
    pub fn load(&mut self, normalized: Normalized<WeatherReport>) {
        self.location = normalized.data.location.clone();
        self.last = Some(normalized);
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.last.as_ref().map(|n| &n.data)
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.last.as_ref().map(|n| &n.diagnostics)
    }
}
