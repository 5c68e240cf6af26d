use std::fmt::Write;

use weather_core::{ForecastEntry, ViewState};

/// Hourly rows printed under the current conditions.
const HOURLY_ROWS: usize = 24;

fn degrees(temperature: &str) -> String {
    if temperature == "Null" {
        temperature.to_string()
    } else {
        format!("{temperature}°")
    }
}

fn hourly_row(entry: &ForecastEntry) -> String {
    format!(
        "  {:<8} {:>5}  {:>5}  {}",
        entry.short_date.as_deref().unwrap_or_default(),
        entry.time.as_deref().unwrap_or_default(),
        degrees(&entry.temperature_text),
        entry.icon_url().unwrap_or_default(),
    )
}

fn daily_row(entry: &ForecastEntry) -> String {
    format!(
        "  {:<18} {:>5}  {}",
        entry.date.as_deref().unwrap_or_default(),
        degrees(&entry.temperature_text),
        entry.icon_url().unwrap_or_default(),
    )
}

/// Text rendering of everything the view model publishes.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    match &state.conditions {
        Some(card) => {
            let _ = writeln!(out, "{}", card.city);
            let _ = writeln!(out, "{}", card.date);
            let _ = writeln!(out, "{}  {}", degrees(&card.temperature), card.description);
            if let Some(url) = &card.icon_url {
                let _ = writeln!(out, "{url}");
            }
        }
        None if !state.error => {
            let _ = writeln!(out, "No weather loaded yet.");
        }
        None => {}
    }

    if !state.hourly.is_empty() {
        match state.forecast.success() {
            Some(coord) => {
                let _ = writeln!(out, "\nHourly ({coord}):");
            }
            None => {
                let _ = writeln!(out, "\nHourly:");
            }
        }
        for entry in state.hourly.iter().take(HOURLY_ROWS) {
            let _ = writeln!(out, "{}", hourly_row(entry));
        }
    }

    if !state.daily.is_empty() {
        let _ = writeln!(out, "\nDaily:");
        for entry in &state.daily {
            let _ = writeln!(out, "{}", daily_row(entry));
        }
    }

    if state.loading {
        let _ = writeln!(out, "\nLoading...");
    }

    if state.error {
        let message = state.last_error.as_deref().filter(|m| !m.is_empty());
        let _ = writeln!(out, "\nCould not load weather: {}", message.unwrap_or("no data"));
    }

    out
}
