use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::config::PressureBand;
use crate::constants::{
    CALM_PRESSURE_DRIFT_MAX_HPA, CALM_PRESSURE_DRIFT_MIN_HPA, CYCLONE_DISSIPATION_PRESSURE_HPA,
    CYCLONE_ONSET_PRESSURE_HPA, CYCLONIC_PRESSURE_DROP_MAX_HPA, CYCLONIC_PRESSURE_DROP_MIN_HPA,
    FORECAST_MAX_HOURS, FORECAST_MIN_HOURS, FORECAST_PRESSURE_JITTER_HPA, FORECAST_WIND_JITTER,
    REFERENCE_SEA_LEVEL_PRESSURE_HPA, SEVERITY_MAX, SEVERITY_MIN, SEVERITY_STEP,
    TICK_WIND_JITTER,
};
use crate::error::{CycloneError, CycloneResult};
use crate::types::{ForecastEntry, WeatherState};
use crate::utils::clamp;

/// Advances the weather record by bounded random perturbations.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendEngine {
    band: PressureBand,
}

impl TrendEngine {
    pub fn new(band: PressureBand) -> Self {
        Self { band }
    }

    pub fn band(&self) -> PressureBand {
        self.band
    }

    /// Applies one simulation interval in place.
    pub fn advance<R: Rng>(
        &self,
        weather: &mut WeatherState,
        rng: &mut R,
        now: DateTime<Utc>,
    ) {
        if weather.cyclonic {
            let drop = rng.random_range(CYCLONIC_PRESSURE_DROP_MIN_HPA..=CYCLONIC_PRESSURE_DROP_MAX_HPA);
            weather.min_pressure = self.band.clamp(weather.min_pressure - drop);
            weather.severity = clamp(weather.severity + SEVERITY_STEP, SEVERITY_MIN, SEVERITY_MAX);
        } else {
            let drift = rng.random_range(CALM_PRESSURE_DRIFT_MIN_HPA..=CALM_PRESSURE_DRIFT_MAX_HPA);
            weather.min_pressure = self.band.clamp(weather.min_pressure + drift);
        }

        let multiplier = wind_multiplier(weather.min_pressure);
        scale_winds(weather, multiplier, TICK_WIND_JITTER, rng);

        if weather.min_pressure < CYCLONE_ONSET_PRESSURE_HPA {
            weather.cyclonic = true;
        } else if weather.min_pressure > CYCLONE_DISSIPATION_PRESSURE_HPA {
            weather.cyclonic = false;
            weather.severity = clamp(weather.severity - SEVERITY_STEP, SEVERITY_MIN, SEVERITY_MAX);
        }

        weather.timestamp = now;
    }

    /// Projects `hours` hourly states forward from `start` without touching it.
    pub fn forecast<R: Rng>(
        &self,
        start: &WeatherState,
        hours: u32,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> CycloneResult<Vec<ForecastEntry>> {
        if !(FORECAST_MIN_HOURS..=FORECAST_MAX_HOURS).contains(&hours) {
            return Err(CycloneError::Validation(format!(
                "Forecast range must be between {FORECAST_MIN_HOURS} and {FORECAST_MAX_HOURS} hours (got {hours})."
            )));
        }

        let mut projected = *start;
        let mut entries = Vec::with_capacity(hours as usize);
        for hour in 1..=hours {
            let jitter = rng.random_range(-FORECAST_PRESSURE_JITTER_HPA..=FORECAST_PRESSURE_JITTER_HPA);
            projected.min_pressure = self.band.clamp(projected.min_pressure + jitter);

            let multiplier = wind_multiplier(projected.min_pressure);
            scale_winds(&mut projected, multiplier, FORECAST_WIND_JITTER, rng);

            let timestamp = now + ChronoDuration::hours(i64::from(hour));
            projected.timestamp = timestamp;
            entries.push(ForecastEntry {
                hour,
                timestamp,
                weather: projected,
            });
        }

        Ok(entries)
    }
}

pub fn wind_multiplier(min_pressure_hpa: f64) -> f64 {
    1.0 + (REFERENCE_SEA_LEVEL_PRESSURE_HPA - min_pressure_hpa) / 1000.0
}

fn scale_winds<R: Rng>(
    weather: &mut WeatherState,
    multiplier: f64,
    jitter: f64,
    rng: &mut R,
) {
    weather.max_wind =
        (weather.max_wind * multiplier + rng.random_range(-jitter..=jitter)).max(0.0);
    weather.directional_winds.for_each_mut(|value| {
        *value = (*value * multiplier + rng.random_range(-jitter..=jitter)).max(0.0);
    });
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn engine() -> TrendEngine {
        TrendEngine::new(PressureBand::default())
    }

    #[test]
    fn invariants_hold_over_long_runs() {
        let engine = engine();
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut weather = WeatherState::baseline(Utc::now());
            weather.min_pressure = 975.0;
            weather.cyclonic = seed % 2 == 0;
            for _ in 0..500 {
                engine.advance(&mut weather, &mut rng, Utc::now());
                assert!(engine.band().contains(weather.min_pressure));
                assert!((0.0..=10.0).contains(&weather.severity));
                assert!(weather.max_wind >= 0.0);
                assert!(weather.directional_winds.values().iter().all(|v| *v >= 0.0));
            }
        }
    }

    #[test]
    fn cyclonic_flag_holds_inside_hysteresis_band() {
        let engine = engine();
        let mut rng = StdRng::seed_from_u64(7);
        let mut weather = WeatherState::baseline(Utc::now());
        weather.min_pressure = 979.0;

        // Calm drift from 979 hPa stays below onset, so the flag sets.
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!(weather.cyclonic);

        // Pressure recovers into the band; the flag is left alone.
        weather.min_pressure = 990.0;
        let before = weather.severity;
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!((980.0..=995.0).contains(&weather.min_pressure));
        assert!(weather.cyclonic);
        assert!(weather.severity > before);

        // Top of the band: still cyclonic.
        weather.min_pressure = 995.4;
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!(weather.min_pressure <= 995.0);
        assert!(weather.cyclonic);

        // Above 995 hPa after the tick: the flag clears.
        weather.min_pressure = 997.0;
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!(weather.min_pressure > 995.0);
        assert!(!weather.cyclonic);
    }

    #[test]
    fn calm_state_inside_band_stays_calm() {
        let engine = engine();
        let mut rng = StdRng::seed_from_u64(3);
        let mut weather = WeatherState::baseline(Utc::now());
        weather.min_pressure = 985.0;
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!(!weather.cyclonic);
        assert_eq!(weather.severity, 0.0);
    }

    #[test]
    fn cyclonic_tick_lowers_pressure_and_raises_severity() {
        let engine = engine();
        let mut rng = StdRng::seed_from_u64(11);
        let mut weather = WeatherState::baseline(Utc::now());
        weather.min_pressure = 970.0;
        weather.cyclonic = true;
        weather.severity = 9.95;

        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!(weather.min_pressure <= 969.5 && weather.min_pressure >= 969.0);
        assert_eq!(weather.severity, 10.0);
    }

    #[test]
    fn severity_decays_only_above_dissipation_pressure() {
        let engine = engine();
        let mut rng = StdRng::seed_from_u64(5);
        let mut weather = WeatherState::baseline(Utc::now());
        weather.min_pressure = 1010.0;
        weather.cyclonic = true;
        weather.severity = 0.05;

        // Cyclonic at 1010 hPa: pressure still falls, then the flag clears.
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert!(!weather.cyclonic);
        assert!((0.0..=0.1).contains(&weather.severity));

        engine.advance(&mut weather, &mut rng, Utc::now());
        assert_eq!(weather.severity, 0.0);
    }

    #[test]
    fn pressure_floors_at_band_minimum() {
        let engine = engine();
        let mut rng = StdRng::seed_from_u64(1);
        let mut weather = WeatherState::baseline(Utc::now());
        weather.min_pressure = 900.2;
        weather.cyclonic = true;
        engine.advance(&mut weather, &mut rng, Utc::now());
        assert_eq!(weather.min_pressure, 900.0);
    }

    #[test]
    fn same_seed_gives_same_tick() {
        let engine = engine();
        let now = Utc::now();
        let mut left = WeatherState::baseline(now);
        let mut right = WeatherState::baseline(now);
        engine.advance(&mut left, &mut StdRng::seed_from_u64(42), now);
        engine.advance(&mut right, &mut StdRng::seed_from_u64(42), now);
        assert_eq!(left, right);
    }

    #[test]
    fn wind_multiplier_is_one_at_reference_pressure() {
        assert_eq!(wind_multiplier(1013.0), 1.0);
        assert!(wind_multiplier(960.0) > 1.0);
        assert!(wind_multiplier(1020.0) < 1.0);
    }

    #[test]
    fn forecast_rejects_out_of_range_horizons() {
        let engine = engine();
        let start = WeatherState::baseline(Utc::now());
        let mut rng = StdRng::seed_from_u64(0);
        for hours in [0, 49] {
            let error = engine
                .forecast(&start, hours, Utc::now(), &mut rng)
                .unwrap_err();
            assert!(error.is_validation());
        }
    }

    #[test]
    fn forecast_returns_ordered_hourly_entries() {
        let engine = engine();
        let now = Utc::now();
        let start = WeatherState::baseline(now);
        let mut rng = StdRng::seed_from_u64(9);

        let entries = engine.forecast(&start, 6, now, &mut rng).unwrap();
        assert_eq!(entries.len(), 6);
        for (idx, entry) in entries.iter().enumerate() {
            assert_eq!(entry.hour, idx as u32 + 1);
            assert!(engine.band().contains(entry.weather.min_pressure));
        }
        assert!(entries
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
        assert!(entries[0].timestamp > now);
        assert_eq!(start, WeatherState::baseline(now));
    }
}
