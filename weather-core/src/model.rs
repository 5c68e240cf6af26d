use serde::{Deserialize, Deserializer};

use crate::format::icon_url;

// ---- wire payloads -------------------------------------------------------
//
// Fields the API may omit or send as `null` decode to their default, so a
// partial payload still maps instead of failing the whole request.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct RawCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RawCoord {
    /// Both components, or `None` if either is missing.
    pub fn coord(&self) -> Option<Coord> {
        Some(Coord::new(self.lat?, self.lon?))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawCondition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawMain {
    pub temp: Option<f64>,
}

/// `/data/2.5/weather` response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawCurrentWeather {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dt: i64,
    /// Shift from UTC in seconds for the resolved location.
    pub timezone: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main: RawMain,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weather: Vec<RawCondition>,
    pub coord: Option<RawCoord>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawHourly {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dt: i64,
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawDailyTemp {
    pub day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawDaily {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dt: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temp: RawDailyTemp,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weather: Vec<RawCondition>,
}

/// `/data/2.5/onecall` response with minutely and alerts excluded.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawForecast {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone_offset: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hourly: Vec<RawHourly>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily: Vec<RawDaily>,
}

// ---- domain records ------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Current conditions for one city at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub city: String,
    pub timestamp: i64,
    pub temperature: Option<i32>,
    pub description: String,
    pub icon: String,
    pub coord: Option<Coord>,
    pub utc_offset: Option<i32>,
}

/// Display strings for the current-conditions card.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentConditions {
    pub city: String,
    pub temperature: String,
    pub date: String,
    pub description: String,
    /// `None` when the payload carried no icon.
    pub icon_url: Option<String>,
}

/// One point of the hourly or daily series.
///
/// Hourly entries carry `short_date` and `time`; daily entries carry `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: i64,
    pub temperature: Option<i32>,
    pub temperature_text: String,
    pub icon: String,
    pub date: Option<String>,
    pub short_date: Option<String>,
    pub time: Option<String>,
}

impl ForecastEntry {
    pub fn icon_url(&self) -> Option<String> {
        icon_url(&self.icon)
    }
}

/// Hourly and daily series from one forecast fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    pub hourly: Vec<ForecastEntry>,
    pub daily: Vec<ForecastEntry>,
}

// ---- request slots -------------------------------------------------------

/// State of one request slot.
///
/// `Idle` until the first request; afterwards every request goes through
/// `Loading` before settling on `Success` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for RequestOutcome<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestOutcome<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Whether moving to `next` is a legal slot transition.
    pub fn can_advance_to(&self, next: &RequestOutcome<T>) -> bool {
        match (self, next) {
            (_, Self::Loading) => true,
            (Self::Loading, Self::Success(_) | Self::Error(_)) => true,
            _ => false,
        }
    }

    /// Moves to `next` if the transition is legal; returns whether it moved.
    pub fn advance(&mut self, next: RequestOutcome<T>) -> bool {
        if !self.can_advance_to(&next) {
            return false;
        }
        *self = next;
        true
    }
}

/// A user request, kept so it can be replayed on retry.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    City(String),
    Coordinates(Coord),
    /// Standalone forecast request.
    Forecast(Coord),
    /// Current weather and forecast for a device position, fetched together.
    Locate(Coord),
}

/// Which request slot an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Current,
    Forecast,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Current => "current",
            Slot::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct PerSlot<T> {
    pub current: T,
    pub forecast: T,
}

impl<T> PerSlot<T> {
    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::Current => &self.current,
            Slot::Forecast => &self.forecast,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::Current => &mut self.current,
            Slot::Forecast => &mut self.forecast,
        }
    }
}

/// Everything the presentation layer renders.
///
/// Display fields (`conditions`, `hourly`, `daily`) keep their last good
/// values when a request fails.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub current: RequestOutcome<WeatherSnapshot>,
    /// Coordinates of the last forecast on success.
    pub forecast: RequestOutcome<Coord>,
    pub conditions: Option<CurrentConditions>,
    pub hourly: Vec<ForecastEntry>,
    pub daily: Vec<ForecastEntry>,
    /// A request is in flight in at least one slot.
    pub loading: bool,
    /// At least one slot failed and has not succeeded since.
    pub error: bool,
    pub last_error: Option<String>,
    pub last_intent: Option<Intent>,
    pub(crate) generations: PerSlot<u64>,
    pub(crate) failed: PerSlot<bool>,
}

impl ViewState {
    pub(crate) fn refresh_flags(&mut self) {
        self.loading = self.current.is_loading() || self.forecast.is_loading();
        self.error = self.failed.current || self.failed.forecast;
        if !self.error {
            self.last_error = None;
        }
    }
}
