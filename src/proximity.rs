use chrono::{DateTime, Utc};

use crate::constants::{
    EARTH_RADIUS_KM, ORANGE_ZONE_FACTOR, RED_ZONE_BASE_KM, RED_ZONE_KM_PER_SEVERITY,
    RED_ZONE_KM_PER_WIND, SEVERITY_MAX, SEVERITY_MIN, YELLOW_ZONE_FACTOR,
};
use crate::error::{CycloneError, CycloneResult};
use crate::types::{AlertEvent, AlertLevel, Coordinates, DangerZones, WeatherState};
use crate::utils::{clamp, round2};

/// Great-circle distance in km.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).abs().to_radians();
    let d_lon = (b.longitude - a.longitude).abs().to_radians();
    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();
    let h = sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lon * sin_lon;
    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Radii grow linearly with severity and max wind; orange and yellow are
/// fixed multiples of red.
pub fn danger_zones(severity: f64, max_wind: f64) -> DangerZones {
    let severity = if severity.is_finite() {
        clamp(severity, SEVERITY_MIN, SEVERITY_MAX)
    } else {
        SEVERITY_MIN
    };
    let max_wind = if max_wind.is_finite() {
        max_wind.max(0.0)
    } else {
        0.0
    };

    let red_km = RED_ZONE_BASE_KM
        + RED_ZONE_KM_PER_SEVERITY * severity
        + RED_ZONE_KM_PER_WIND * max_wind;
    DangerZones {
        red_km,
        orange_km: red_km * ORANGE_ZONE_FACTOR,
        yellow_km: red_km * YELLOW_ZONE_FACTOR,
    }
}

pub fn classify(distance_km: f64, zones: &DangerZones) -> Option<AlertLevel> {
    if distance_km <= zones.red_km {
        Some(AlertLevel::Critical)
    } else if distance_km <= zones.orange_km {
        Some(AlertLevel::Warning)
    } else if distance_km <= zones.yellow_km {
        Some(AlertLevel::Precaution)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityAssessment {
    pub distance_km: f64,
    pub zones: DangerZones,
    pub level: Option<AlertLevel>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProximityEngine {
    always_alert: bool,
}

impl ProximityEngine {
    pub fn new(always_alert: bool) -> Self {
        Self { always_alert }
    }

    pub fn always_alert(&self) -> bool {
        self.always_alert
    }

    pub fn assess(
        &self,
        observer: Coordinates,
        weather: Option<&WeatherState>,
    ) -> CycloneResult<ProximityAssessment> {
        if !observer.is_valid() {
            return Err(CycloneError::Validation(format!(
                "Invalid observer location ({}, {}).",
                observer.latitude, observer.longitude
            )));
        }
        let weather = weather.ok_or_else(|| {
            CycloneError::Unavailable("Cyclone center coordinates not available.".to_string())
        })?;
        if !weather.center.is_valid() {
            return Err(CycloneError::Unavailable(
                "Cyclone center coordinates not available.".to_string(),
            ));
        }

        let distance_km = haversine_km(observer, weather.center);
        let zones = danger_zones(weather.severity, weather.max_wind);
        let level = classify(distance_km, &zones).or(if self.always_alert {
            Some(AlertLevel::Precaution)
        } else {
            None
        });

        Ok(ProximityAssessment {
            distance_km,
            zones,
            level,
        })
    }

    pub fn evaluate(
        &self,
        observer: Coordinates,
        weather: Option<&WeatherState>,
        now: DateTime<Utc>,
    ) -> CycloneResult<Option<AlertEvent>> {
        let assessment = self.assess(observer, weather)?;
        Ok(self.alert_for(&assessment, now))
    }

    pub fn alert_for(
        &self,
        assessment: &ProximityAssessment,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        assessment.level.map(|level| AlertEvent {
            level,
            distance_km: assessment.distance_km,
            zones: assessment.zones,
            message: self.alert_message(assessment.distance_km),
            timestamp: now,
            test_mode: self.always_alert,
        })
    }

    fn alert_message(&self, distance_km: f64) -> String {
        let test_note = if self.always_alert { " [TEST MODE]" } else { "" };
        format!(
            "Cyclone Alert{test_note}! A cyclone is approximately {} km away from your location. Please take necessary precautions.",
            round2(distance_km)
        )
    }
}
