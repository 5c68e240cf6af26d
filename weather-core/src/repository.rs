use async_trait::async_trait;

use crate::{
    api::{HttpFailure, OpenWeatherClient},
    model::{RawCurrentWeather, RawForecast},
};

/// Data access used by the view model. Implementations must not cache.
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    async fn current_weather_by_name(&self, city: &str) -> Result<RawCurrentWeather, HttpFailure>;

    async fn current_weather_by_coord(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<RawCurrentWeather, HttpFailure>;

    async fn forecast(&self, lat: f64, lon: f64) -> Result<RawForecast, HttpFailure>;
}

/// Pass-through repository over the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiRepository {
    client: OpenWeatherClient,
}

impl ApiRepository {
    pub fn new(client: OpenWeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WeatherRepository for ApiRepository {
    async fn current_weather_by_name(&self, city: &str) -> Result<RawCurrentWeather, HttpFailure> {
        self.client.fetch_current_weather_by_name(city).await
    }

    async fn current_weather_by_coord(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<RawCurrentWeather, HttpFailure> {
        self.client.fetch_current_weather_by_coord(lat, lon).await
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<RawForecast, HttpFailure> {
        self.client.fetch_forecast(lat, lon).await
    }
}
