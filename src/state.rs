use std::f64::consts::PI;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::BasinBox;
use crate::constants::{
    BASELINE_LATITUDE_DEG, BASELINE_LONGITUDE_DEG, HARSH_HIGH_WIND_NE, HARSH_LOW_WIND_NE,
    HARSH_MAX_WIND, HARSH_MODERATE_WIND_NE, HARSH_OFFSET_MAX_DEG, HARSH_OFFSET_MIN_DEG,
    HARSH_PRESSURE_HPA, HARSH_SEVERITY, SIMULATED_CYCLONE_PRESSURE_HPA,
};
use crate::error::CycloneResult;
use crate::trend::TrendEngine;
use crate::types::{Coordinates, ForecastEntry, WeatherState};

struct Inner {
    weather: WeatherState,
    rng: StdRng,
    ticks: u64,
}

/// Owner of the process-wide weather record.
///
/// Every mutation runs under one write guard, so readers only ever see a
/// fully applied tick. Reads hand out copies.
pub struct WeatherStore {
    inner: RwLock<Inner>,
    engine: TrendEngine,
    basin: BasinBox,
}

impl WeatherStore {
    pub fn new(engine: TrendEngine, basin: BasinBox, rng: StdRng) -> Self {
        Self {
            inner: RwLock::new(Inner {
                weather: WeatherState::baseline(Utc::now()),
                rng,
                ticks: 0,
            }),
            engine,
            basin,
        }
    }

    pub fn from_seed(engine: TrendEngine, basin: BasinBox, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(engine, basin, rng)
    }

    pub async fn read(&self) -> WeatherState {
        self.inner.read().await.weather
    }

    pub async fn tick_count(&self) -> u64 {
        self.inner.read().await.ticks
    }

    pub async fn apply_tick(&self) -> WeatherState {
        let mut inner = self.inner.write().await;
        let Inner { weather, rng, ticks } = &mut *inner;
        self.engine.advance(weather, rng, Utc::now());
        *ticks += 1;
        *weather
    }

    /// Restores baseline values with a random center inside the basin.
    pub async fn force_reset(&self) -> WeatherState {
        let mut inner = self.inner.write().await;
        let latitude = inner
            .rng
            .random_range(self.basin.lat_min_deg..=self.basin.lat_max_deg);
        let longitude = inner
            .rng
            .random_range(self.basin.lon_min_deg..=self.basin.lon_max_deg);

        let mut weather = WeatherState::baseline(Utc::now());
        weather.center = Coordinates::new(latitude, longitude);
        inner.weather = weather;
        info!(
            "Weather state reset to baseline at ({:.3}, {:.3})",
            latitude, longitude
        );
        weather
    }

    /// Test-only override: a dangerous cyclone parked 20-30 km from the
    /// reference center.
    pub async fn force_harsh(&self) -> WeatherState {
        let mut inner = self.inner.write().await;
        let offset = inner
            .rng
            .random_range(HARSH_OFFSET_MIN_DEG..=HARSH_OFFSET_MAX_DEG);
        let bearing = inner.rng.random_range(0.0..(2.0 * PI));

        let weather = &mut inner.weather;
        weather.center = Coordinates::new(
            BASELINE_LATITUDE_DEG + offset * bearing.cos(),
            BASELINE_LONGITUDE_DEG
                + offset * bearing.sin() / BASELINE_LATITUDE_DEG.to_radians().cos(),
        );
        weather.min_pressure = HARSH_PRESSURE_HPA;
        weather.max_wind = HARSH_MAX_WIND;
        weather.cyclonic = true;
        weather.severity = HARSH_SEVERITY;
        weather.directional_winds.low_ne = HARSH_LOW_WIND_NE;
        weather.directional_winds.moderate_ne = HARSH_MODERATE_WIND_NE;
        weather.directional_winds.high_ne = HARSH_HIGH_WIND_NE;
        weather.timestamp = Utc::now();
        info!("Harsh cyclone configuration forced (test override)");
        *weather
    }

    pub async fn force_cyclonic(&self) -> WeatherState {
        let mut inner = self.inner.write().await;
        let weather = &mut inner.weather;
        weather.cyclonic = true;
        weather.min_pressure = weather.min_pressure.min(SIMULATED_CYCLONE_PRESSURE_HPA);
        weather.timestamp = Utc::now();
        *weather
    }

    /// Forecast from the current state. The shared record is left as is.
    pub async fn forecast(&self, hours: u32) -> CycloneResult<Vec<ForecastEntry>> {
        let (start, mut rng) = {
            let mut inner = self.inner.write().await;
            let forked = StdRng::from_rng(&mut inner.rng);
            (inner.weather, forked)
        };
        self.engine.forecast(&start, hours, Utc::now(), &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PressureBand;

    fn store(seed: u64) -> WeatherStore {
        WeatherStore::from_seed(
            TrendEngine::new(PressureBand::default()),
            BasinBox::default(),
            Some(seed),
        )
    }

    #[tokio::test]
    async fn reset_restores_baseline_inside_basin() {
        let store = store(1);
        store.force_harsh().await;
        store.force_reset().await;

        let weather = store.read().await;
        assert!(!weather.cyclonic);
        assert_eq!(weather.severity, 0.0);
        assert_eq!(weather.min_pressure, 1000.0);
        assert_eq!(weather.max_wind, 100.0);
        assert!(BasinBox::default().contains(weather.center.latitude, weather.center.longitude));
    }

    #[tokio::test]
    async fn harsh_configuration_is_dangerous_and_near_reference() {
        let store = store(2);
        let weather = store.force_harsh().await;
        assert!(weather.cyclonic);
        assert_eq!(weather.severity, 7.0);
        assert_eq!(weather.min_pressure, 960.0);
        assert_eq!(weather.max_wind, 200.0);
        assert_eq!(weather.directional_winds.high_ne, 150.0);
        assert_eq!(weather.directional_winds.high_sw, 70.0);

        let dlat = weather.center.latitude - 20.0;
        assert!(dlat.abs() <= 0.27 + 1e-9);
        assert!((weather.center.longitude - 80.0).abs() <= 0.3);
    }

    #[tokio::test]
    async fn force_cyclonic_caps_pressure() {
        let store = store(3);
        let weather = store.force_cyclonic().await;
        assert!(weather.cyclonic);
        assert_eq!(weather.min_pressure, 970.0);
    }

    #[tokio::test]
    async fn read_returns_a_copy() {
        let store = store(4);
        let before = store.read().await;
        store.apply_tick().await;
        let after = store.read().await;
        assert_eq!(store.tick_count().await, 1);
        assert_eq!(before.center, after.center);
        assert!(after.timestamp >= before.timestamp);
    }

    #[tokio::test]
    async fn forecast_does_not_mutate_shared_state() {
        let store = store(5);
        let before = store.read().await;
        let entries = store.forecast(12).await.unwrap();
        assert_eq!(entries.len(), 12);
        assert_eq!(store.read().await, before);
        assert!(store.forecast(0).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_partial_ticks() {
        let store = std::sync::Arc::new(store(6));
        store.force_harsh().await;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    store.apply_tick().await;
                }
            })
        };
        for _ in 0..200 {
            let weather = store.read().await;
            assert!((900.0..=1020.0).contains(&weather.min_pressure));
            assert!((0.0..=10.0).contains(&weather.severity));
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
        assert_eq!(store.tick_count().await, 200);
    }
}
