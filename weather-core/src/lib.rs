//! Core library for the `weather` app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client and the repository seam over it
//! - Display formatting for temperatures and dates
//! - The view model that sequences requests and publishes observable state
//!
//! It is used by `weather-cli`, but any front end can drive a
//! [`WeatherViewModel`] and render what it publishes.

pub mod api;
pub mod config;
pub mod format;
pub mod mapping;
pub mod model;
pub mod orchestrator;
pub mod repository;

pub use api::{HttpFailure, OpenWeatherClient};
pub use config::Config;
pub use format::{DateFormatter, format_temperature};
pub use model::{
    Coord, CurrentConditions, Forecast, ForecastEntry, Intent, RequestOutcome, Slot, ViewState,
    WeatherSnapshot,
};
pub use orchestrator::WeatherViewModel;
pub use repository::{ApiRepository, WeatherRepository};
