//! The view model: sequences repository calls and publishes [`ViewState`].
//!
//! State lives in a `tokio::sync::watch` channel. Only this module writes
//! it; the presentation layer holds receivers from [`WeatherViewModel::subscribe`].
//!
//! Each slot (current weather, forecast) carries a generation counter. Starting
//! a request bumps it, and a completion is applied only if its generation is
//! still the latest, so a slow response for an earlier search cannot overwrite
//! a newer one.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    api::HttpFailure,
    format::DateFormatter,
    mapping::{conditions_from, forecast_from, snapshot_from},
    model::{Coord, Intent, RawCurrentWeather, RequestOutcome, Slot, ViewState},
    repository::WeatherRepository,
};

#[derive(Clone)]
pub struct WeatherViewModel {
    inner: Arc<Inner>,
}

struct Inner {
    repository: Arc<dyn WeatherRepository>,
    state: watch::Sender<ViewState>,
    dates: DateFormatter,
}

impl std::fmt::Debug for WeatherViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherViewModel")
            .field("state", &*self.inner.state.borrow())
            .field("dates", &self.inner.dates)
            .finish_non_exhaustive()
    }
}

impl WeatherViewModel {
    pub fn new(repository: Arc<dyn WeatherRepository>) -> Self {
        Self::with_dates(repository, DateFormatter::utc())
    }

    /// `dates` is used when a payload does not carry its own UTC offset.
    pub fn with_dates(repository: Arc<dyn WeatherRepository>, dates: DateFormatter) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { inner: Arc::new(Inner { repository, state, dates }) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.inner.state.borrow().clone()
    }

    /// Looks up current weather by city name, then fetches the forecast for the
    /// coordinates the lookup returned.
    pub async fn search_by_city_name(&self, city: &str) {
        let generation = self.begin(Slot::Current, Some(Intent::City(city.to_string())));
        let result = self.inner.repository.current_weather_by_name(city).await;

        match self.complete_current(generation, result) {
            Some(Some(coord)) => self.forecast_for(coord, None).await,
            Some(None) => tracing::warn!("no coordinates for '{city}', forecast not requested"),
            None => {}
        }
    }

    /// Current weather for a position. Does not fetch the forecast.
    pub async fn search_by_coordinates(&self, lat: f64, lon: f64) {
        let coord = Coord::new(lat, lon);
        self.current_by_coord(coord, Intent::Coordinates(coord)).await;
    }

    /// Standalone forecast fetch; recorded as the intent `retry` replays.
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) {
        let coord = Coord::new(lat, lon);
        self.forecast_for(coord, Some(Intent::Forecast(coord))).await;
    }

    /// Device-position flow: current weather and forecast run concurrently.
    pub async fn locate(&self, lat: f64, lon: f64) {
        let coord = Coord::new(lat, lon);
        tokio::join!(
            self.current_by_coord(coord, Intent::Locate(coord)),
            self.forecast_for(coord, None),
        );
    }

    /// Re-issues the last intent. Returns `false` if nothing was requested yet.
    pub async fn retry(&self) -> bool {
        let intent = self.inner.state.borrow().last_intent.clone();

        match intent {
            Some(Intent::City(city)) => self.search_by_city_name(&city).await,
            Some(Intent::Coordinates(c)) => self.search_by_coordinates(c.lat, c.lon).await,
            Some(Intent::Forecast(c)) => self.fetch_forecast(c.lat, c.lon).await,
            Some(Intent::Locate(c)) => self.locate(c.lat, c.lon).await,
            None => return false,
        }
        true
    }

    /// Forecast fetch shared by the public operations. Chained fetches pass no
    /// intent so the search that triggered them stays the one replayed.
    async fn forecast_for(&self, coord: Coord, intent: Option<Intent>) {
        let Coord { lat, lon } = coord;
        let generation = self.begin(Slot::Forecast, intent);

        match self.inner.repository.forecast(lat, lon).await {
            Ok(raw) => {
                let forecast = forecast_from(&raw, self.inner.dates);
                tracing::debug!(
                    hourly = forecast.hourly.len(),
                    daily = forecast.daily.len(),
                    "forecast received"
                );

                self.settle(Slot::Forecast, generation, |s| {
                    s.forecast.advance(RequestOutcome::Success(Coord::new(lat, lon)));
                    s.hourly = forecast.hourly;
                    s.daily = forecast.daily;
                    s.failed.forecast = false;
                });
            }
            Err(failure) => self.fail(Slot::Forecast, generation, failure),
        }
    }

    pub fn spawn_search_by_city_name(&self, city: impl Into<String>) -> JoinHandle<()> {
        let vm = self.clone();
        let city = city.into();
        tokio::spawn(async move { vm.search_by_city_name(&city).await })
    }

    pub fn spawn_search_by_coordinates(&self, lat: f64, lon: f64) -> JoinHandle<()> {
        let vm = self.clone();
        tokio::spawn(async move { vm.search_by_coordinates(lat, lon).await })
    }

    pub fn spawn_fetch_forecast(&self, lat: f64, lon: f64) -> JoinHandle<()> {
        let vm = self.clone();
        tokio::spawn(async move { vm.fetch_forecast(lat, lon).await })
    }

    pub fn spawn_locate(&self, lat: f64, lon: f64) -> JoinHandle<()> {
        let vm = self.clone();
        tokio::spawn(async move { vm.locate(lat, lon).await })
    }

    pub fn spawn_retry(&self) -> JoinHandle<bool> {
        let vm = self.clone();
        tokio::spawn(async move { vm.retry().await })
    }

    async fn current_by_coord(&self, coord: Coord, intent: Intent) {
        let generation = self.begin(Slot::Current, Some(intent));
        let result = self.inner.repository.current_weather_by_coord(coord.lat, coord.lon).await;
        self.complete_current(generation, result);
    }

    /// Publishes a current-weather result. Returns `None` unless a success was
    /// applied, otherwise the coordinates it carried.
    fn complete_current(
        &self,
        generation: u64,
        result: Result<RawCurrentWeather, HttpFailure>,
    ) -> Option<Option<Coord>> {
        let raw = match result {
            Ok(raw) => raw,
            Err(failure) => {
                self.fail(Slot::Current, generation, failure);
                return None;
            }
        };

        let snapshot = snapshot_from(raw);
        let conditions = conditions_from(&snapshot, self.inner.dates);
        let coord = snapshot.coord;

        let applied = self.settle(Slot::Current, generation, |s| {
            s.current.advance(RequestOutcome::Success(snapshot));
            s.conditions = Some(conditions);
            s.failed.current = false;
        });

        applied.then_some(coord)
    }

    fn begin(&self, slot: Slot, intent: Option<Intent>) -> u64 {
        let mut generation = 0;

        self.inner.state.send_modify(|s| {
            let current = s.generations.get_mut(slot);
            *current += 1;
            generation = *current;

            match slot {
                Slot::Current => s.current.advance(RequestOutcome::Loading),
                Slot::Forecast => s.forecast.advance(RequestOutcome::Loading),
            };
            if intent.is_some() {
                s.last_intent = intent;
            }
            s.refresh_flags();
        });

        tracing::debug!(%slot, generation, "request started");
        generation
    }

    fn fail(&self, slot: Slot, generation: u64, failure: HttpFailure) {
        let message = failure.to_string();
        tracing::warn!(%slot, "request failed: {failure:?}");

        self.settle(slot, generation, |s| {
            match slot {
                Slot::Current => s.current.advance(RequestOutcome::Error(message.clone())),
                Slot::Forecast => s.forecast.advance(RequestOutcome::Error(message.clone())),
            };
            *s.failed.get_mut(slot) = true;
            s.last_error = Some(message);
        });
    }

    /// Applies `apply` if `generation` is still the slot's latest request.
    fn settle(&self, slot: Slot, generation: u64, apply: impl FnOnce(&mut ViewState)) -> bool {
        let applied = self.inner.state.send_if_modified(|s| {
            if *s.generations.get(slot) != generation {
                return false;
            }
            apply(s);
            s.refresh_flags();
            true
        });

        if !applied {
            tracing::debug!(%slot, generation, "dropping stale completion");
        }
        applied
    }
}
