//! Terminal rendering of normalized weather data.

use std::io::{self, Write};

use weatherdash_core::{
    Diagnostics, SearchList, TemperatureUnit, WeatherReport,
    model::{DaySummary, ForecastHour},
    units::{self, Sky},
};

const ADVISORY_TITLE: &str = "Information Missing from Location:";

/// Full dashboard: location header, current conditions, upcoming days,
/// today's hourly breakdown, then the missing-data advisory if any.
pub fn dashboard(
    out: &mut impl Write,
    report: &WeatherReport,
    diagnostics: &Diagnostics,
    unit: TemperatureUnit,
) -> io::Result<()> {
    if report.location.is_empty() {
        writeln!(out, "Unknown location")?;
    } else {
        writeln!(out, "{}", report.location)?;
    }
    writeln!(out)?;

    current(out, report, unit)?;

    if !report.upcoming().is_empty() {
        writeln!(out)?;
        writeln!(out, "Forecast")?;
        for day in report.upcoming() {
            let label = day
                .hours
                .first()
                .and_then(|h| units::weekday_label(&h.time, true))
                .or_else(|| units::weekday_label(&day.date, true))
                .unwrap_or_else(|| "---".to_string());
            writeln!(
                out,
                "  {label:<4} {:<28} {}",
                or_na(&day.day.condition.text),
                snapshot(&day.day, unit)
            )?;
        }
    }

    if let Some(today) = report.today() {
        writeln!(out)?;
        hourly(out, &today.hours, unit)?;
    }

    if let Some(text) = advisory(diagnostics) {
        writeln!(out)?;
        writeln!(out, "{text}")?;
    }

    Ok(())
}

fn current(out: &mut impl Write, report: &WeatherReport, unit: TemperatureUnit) -> io::Result<()> {
    let now = &report.current;
    let weekday = units::weekday_label(&now.last_updated, false).unwrap_or_default();
    let as_of = if now.last_updated.is_empty() { "--" } else { now.last_updated.as_str() };

    writeln!(out, "{weekday} (as of: {as_of})")?;
    writeln!(
        out,
        "  {}{}  {}  [{}]",
        units::show(units::current_temp(now, unit)),
        unit.temp_suffix(),
        or_na(&now.condition.text),
        sky_name(units::sky_for(now.condition.code())),
    )?;
    writeln!(
        out,
        "  Wind: {} {}",
        units::show(units::current_wind(now, unit)),
        unit.wind_suffix()
    )?;

    if let Some(today) = report.today() {
        writeln!(out, "  {}", snapshot(&today.day, unit))?;
    }
    Ok(())
}

fn hourly(out: &mut impl Write, hours: &[ForecastHour], unit: TemperatureUnit) -> io::Result<()> {
    writeln!(out, "{:<6} {:>6} {:<28} {:>6} {:>8}", "Time", "Temp", "Condition", "Prec %", "Wind")?;
    for hour in hours {
        let time = units::hour_label(&hour.time);
        writeln!(
            out,
            "{:<6} {:>6} {:<28} {:>6} {:>8}",
            if time.is_empty() { "--:--" } else { time },
            format!("{}{}", units::show(units::hour_temp(hour, unit)), unit.temp_suffix()),
            or_na(&hour.condition.text),
            format!("{}%", units::show(units::hour_precipitation(hour))),
            format!("{} {}", units::show(units::hour_wind(hour, unit)), unit.wind_suffix()),
        )?;
    }
    Ok(())
}

/// `High: 68°F  Low: 59°F  Prec: 86%`
fn snapshot(day: &DaySummary, unit: TemperatureUnit) -> String {
    format!(
        "High: {}{suffix}  Low: {}{suffix}  Prec: {}%",
        units::show(units::daily_high(day, unit)),
        units::show(units::daily_low(day, unit)),
        units::show(units::daily_precipitation(day)),
        suffix = unit.temp_suffix(),
    )
}

/// Advisory listing every diagnostic, or `None` when the data was complete.
pub fn advisory(diagnostics: &Diagnostics) -> Option<String> {
    if diagnostics.is_empty() {
        return None;
    }
    Some(format!("{ADVISORY_TITLE}\n{diagnostics}"))
}

/// Numbered options, or the list's status message when there are none.
pub fn search_results(out: &mut impl Write, list: &SearchList) -> io::Result<()> {
    match list.status().message() {
        Some(message) => writeln!(out, "{message}")?,
        None => {
            for (i, location) in list.options().iter().enumerate() {
                writeln!(out, "{:>2}. {location}", i + 1)?;
            }
        }
    }

    if let Some(text) = advisory(list.diagnostics()) {
        writeln!(out, "{text}")?;
    }
    Ok(())
}

fn or_na(text: &str) -> &str {
    if text.is_empty() { "N/A" } else { text }
}

fn sky_name(sky: Sky) -> &'static str {
    match sky {
        Sky::Clear => "clear",
        Sky::Cloudy => "cloudy",
        Sky::Other => "unsettled",
    }
}
