//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider transport seam and its WeatherAPI.com implementation
//! - Normalization of provider JSON into a fixed schema, with diagnostics
//! - The request gateway (in-flight tracking, search staleness)
//! - Display-time unit formatting and application state
//!
//! It is used by `weatherdash-cli`, but can also be reused by other front ends.

pub mod config;
pub mod diagnostics;
pub mod gateway;
pub mod location;
pub mod model;
pub mod normalize;
pub mod search;
pub mod source;
pub mod state;
pub mod units;

pub use config::Config;
pub use diagnostics::Diagnostics;
pub use gateway::{GatewayError, RequestGateway, SearchOutcome, SearchStamp};
pub use location::Location;
pub use model::{Normalized, WeatherKind, WeatherReport};
pub use normalize::ResponseNormalizer;
pub use search::{Debouncer, SearchList, SearchStatus};
pub use source::{Query, WeatherSource};
pub use state::AppState;
pub use units::TemperatureUnit;
