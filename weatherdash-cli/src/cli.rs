use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Select, Text, validator::Validation};
use std::io::{self, Write};

use weatherdash_core::{
    AppState, Config, Location, RequestGateway, SearchList, TemperatureUnit, WeatherKind,
    config::MAX_FORECAST_DAYS, search::is_searchable, source::select_source,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and display preferences.
    Configure,

    /// Show current conditions and the forecast for a location.
    Show {
        /// Location search string; detected from your IP when omitted.
        location: Option<String>,

        /// Only current conditions, no forecast.
        #[arg(long)]
        current: bool,

        /// Temperature unit: "f" or "c". Defaults to the configured unit.
        #[arg(long)]
        units: Option<String>,

        /// Days of forecast after today (0 to 13). Defaults to the configured value.
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_FORECAST_DAYS))
        )]
        days: Option<u32>,

        /// Use built-in sample data instead of contacting the provider.
        #[arg(long)]
        offline: bool,
    },

    /// Look up locations by name.
    Search {
        /// Partial place name, at least three characters.
        text: String,

        /// Choose one of the results and show its forecast.
        #[arg(long)]
        pick: bool,

        /// Use built-in sample data instead of contacting the provider.
        #[arg(long)]
        offline: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, current, units, days, offline } => {
                let mut config = Config::load()?;
                if let Some(days) = days {
                    config.forecast_days = days;
                }

                let mut state = AppState::new(config.units);
                if let Some(units) = units {
                    state.set_unit(TemperatureUnit::try_from(units.as_str())?);
                }

                let kind = if current { WeatherKind::Current } else { WeatherKind::Forecast };
                let source = select_source(&config, offline)?;
                let gateway = RequestGateway::new(source, config.forecast_days);

                state.select_location(location.map(free_text_location).unwrap_or_default());
                show(&gateway, &mut state, kind).await
            }
            Command::Search { text, pick, offline } => {
                let config = Config::load()?;
                let source = select_source(&config, offline)?;
                let gateway = RequestGateway::new(source, config.forecast_days);
                let mut list = SearchList::new();

                if !is_searchable(&text, config.min_search_chars) {
                    list.reset();
                    render::search_results(&mut io::stdout().lock(), &list)?;
                    return Ok(());
                }

                let pending = gateway.search(&text);
                let stamp = pending.stamp();
                list.begin(stamp);
                match pending.await {
                    Ok(outcome) => {
                        list.apply(outcome);
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "search failed");
                        list.fail(stamp);
                    }
                }

                if !pick || list.options().is_empty() {
                    render::search_results(&mut io::stdout().lock(), &list)?;
                    return Ok(());
                }

                let choice = Select::new("Location:", list.options().to_vec())
                    .prompt()
                    .context("No location selected")?;

                let mut state = AppState::new(config.units);
                state.select_location(choice);
                show(&gateway, &mut state, WeatherKind::Forecast).await
            }
        }
    }
}

/// Free text typed by the user goes to the provider as-is.
fn free_text_location(text: String) -> Location {
    Location::new(text.trim(), "", "")
}

async fn show(
    gateway: &RequestGateway,
    state: &mut AppState,
    kind: WeatherKind,
) -> anyhow::Result<()> {
    let normalized = gateway
        .fetch_weather(kind, state.location())
        .await
        .context("Could Not Contact Server.")?;
    state.load(normalized);

    let (Some(report), Some(diagnostics)) = (state.report(), state.diagnostics()) else {
        anyhow::bail!("No weather data in memory");
    };

    let mut out = io::stdout().lock();
    render::dashboard(&mut out, report, diagnostics, state.unit())?;
    out.flush()?;
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("WeatherAPI.com API key:")
        .with_default(config.api_key().unwrap_or_default())
        .with_validator(|input: &str| {
            Ok(if input.trim().is_empty() {
                Validation::Invalid("API key must not be empty".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let units = vec![TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius];
    let start = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Temperature unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read temperature unit")?;

    let days = Text::new("Forecast days after today:")
        .with_default(&config.forecast_days.to_string())
        .with_validator(|input: &str| {
            Ok(match input.trim().parse::<u32>() {
                Ok(d) if d <= MAX_FORECAST_DAYS => Validation::Valid,
                _ => Validation::Invalid(
                    format!("Enter a whole number between 0 and {MAX_FORECAST_DAYS}").into(),
                ),
            })
        })
        .prompt()
        .context("Failed to read forecast days")?;
    config.forecast_days = days.trim().parse().context("Invalid forecast days")?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
