use reqwest::{Client, Request, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{RawCurrentWeather, RawForecast};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_LANGUAGE: &str = "ru";
const FORECAST_EXCLUDE: &str = "minutely,alerts";

/// A failed round trip. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum HttpFailure {
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP status; `message` is the status reason phrase.
    #[error("{message}")]
    Status { code: u16, message: String },

    /// Success status with nothing to decode.
    #[error("")]
    EmptyBody,

    #[error("{0}")]
    Decode(String),
}

impl HttpFailure {
    fn from_status(status: StatusCode) -> Self {
        let message = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());

        HttpFailure::Status { code: status.as_u16(), message }
    }
}

impl From<reqwest::Error> for HttpFailure {
    fn from(err: reqwest::Error) -> Self {
        HttpFailure::Transport(err.to_string())
    }
}

/// OpenWeatherMap client. Key, units and language are fixed per instance.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    units: String,
    language: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_http(Client::new(), api_key)
    }

    pub fn with_http(http: Client, api_key: String) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            units: DEFAULT_UNITS.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub async fn fetch_current_weather_by_name(
        &self,
        city: &str,
    ) -> Result<RawCurrentWeather, HttpFailure> {
        let request = self.current_by_name_request(city)?;
        self.execute(request).await
    }

    pub async fn fetch_current_weather_by_coord(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<RawCurrentWeather, HttpFailure> {
        let request = self.current_by_coord_request(lat, lon)?;
        self.execute(request).await
    }

    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<RawForecast, HttpFailure> {
        let request = self.forecast_request(lat, lon)?;
        self.execute(request).await
    }

    fn current_by_name_request(&self, city: &str) -> reqwest::Result<Request> {
        self.http
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city)])
            .query(&self.fixed_params())
            .build()
    }

    fn current_by_coord_request(&self, lat: f64, lon: f64) -> reqwest::Result<Request> {
        self.http
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("lat", lat), ("lon", lon)])
            .query(&self.fixed_params())
            .build()
    }

    fn forecast_request(&self, lat: f64, lon: f64) -> reqwest::Result<Request> {
        self.http
            .get(format!("{}/data/2.5/onecall", self.base_url))
            .query(&[("lat", lat), ("lon", lon)])
            .query(&[("exclude", FORECAST_EXCLUDE)])
            .query(&self.fixed_params())
            .build()
    }

    fn fixed_params(&self) -> [(&'static str, &str); 3] {
        [
            ("appid", self.api_key.as_str()),
            ("units", self.units.as_str()),
            ("lang", self.language.as_str()),
        ]
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T, HttpFailure> {
        let path = request.url().path().to_string();
        tracing::debug!("GET {path}");

        let res = self.http.execute(request).await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!("{path} failed with status {status}");
            return Err(HttpFailure::from_status(status));
        }

        let body = res.text().await?;
        decode_payload(&body)
    }
}

/// Decodes a success body. An empty body or a JSON `null` is
/// [`HttpFailure::EmptyBody`].
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T, HttpFailure> {
    if body.trim().is_empty() {
        return Err(HttpFailure::EmptyBody);
    }

    let payload: Option<T> =
        serde_json::from_str(body).map_err(|err| HttpFailure::Decode(err.to_string()))?;

    payload.ok_or(HttpFailure::EmptyBody)
}
