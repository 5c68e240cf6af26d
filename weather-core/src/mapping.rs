//! Raw payload → display record conversion.

use crate::{
    format::{DateFormatter, celsius_to_display, format_temperature, icon_url},
    model::{
        CurrentConditions, Forecast, ForecastEntry, RawCondition, RawCurrentWeather, RawForecast,
        WeatherSnapshot,
    },
};

pub fn snapshot_from(raw: RawCurrentWeather) -> WeatherSnapshot {
    let (description, icon) = match raw.weather.first() {
        Some(condition) => (condition.description.clone(), condition.icon.clone()),
        None => {
            tracing::warn!("current weather for '{}' has no condition entry", raw.name);
            (String::new(), String::new())
        }
    };

    WeatherSnapshot {
        city: raw.name,
        timestamp: raw.dt,
        temperature: raw.main.temp.map(celsius_to_display),
        description,
        icon,
        coord: raw.coord.and_then(|c| c.coord()),
        utc_offset: raw.timezone,
    }
}

pub fn conditions_from(snapshot: &WeatherSnapshot, fallback: DateFormatter) -> CurrentConditions {
    let dates = DateFormatter::from_offset_seconds(snapshot.utc_offset, fallback);

    CurrentConditions {
        city: snapshot.city.clone(),
        temperature: format_temperature(snapshot.temperature),
        date: dates.long_date(snapshot.timestamp),
        description: snapshot.description.clone(),
        icon_url: icon_url(&snapshot.icon),
    }
}

/// Maps both series in source order.
pub fn forecast_from(raw: &RawForecast, fallback: DateFormatter) -> Forecast {
    let dates = DateFormatter::from_offset_seconds(raw.timezone_offset, fallback);

    let hourly = raw
        .hourly
        .iter()
        .map(|item| {
            let temperature = item.temp.map(celsius_to_display);
            ForecastEntry {
                timestamp: item.dt,
                temperature,
                temperature_text: format_temperature(temperature),
                icon: icon_of(&item.weather),
                date: None,
                short_date: Some(dates.short_date(item.dt)),
                time: Some(dates.time(item.dt)),
            }
        })
        .collect();

    let daily = raw
        .daily
        .iter()
        .map(|item| {
            let temperature = item.temp.day.map(celsius_to_display);
            ForecastEntry {
                timestamp: item.dt,
                temperature,
                temperature_text: format_temperature(temperature),
                icon: icon_of(&item.weather),
                date: Some(dates.long_date(item.dt)),
                short_date: None,
                time: None,
            }
        })
        .collect();

    Forecast { hourly, daily }
}

fn icon_of(weather: &[RawCondition]) -> String {
    weather.first().map(|c| c.icon.clone()).unwrap_or_default()
}
