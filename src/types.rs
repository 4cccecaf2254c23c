use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    BASELINE_HIGH_WIND, BASELINE_LATITUDE_DEG, BASELINE_LONGITUDE_DEG, BASELINE_LOW_WIND,
    BASELINE_MAX_WIND, BASELINE_MODERATE_WIND, BASELINE_PRESSURE_HPA,
};

pub const FEATURE_LATITUDE: &str = "Latitude";
pub const FEATURE_LONGITUDE: &str = "Longitude";
pub const FEATURE_MAX_WIND: &str = "Maximum Wind";
pub const FEATURE_MIN_PRESSURE: &str = "Minimum Pressure";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindTier {
    Low,
    Moderate,
    High,
}

impl WindTier {
    pub const ALL: [WindTier; 3] = [WindTier::Low, WindTier::Moderate, WindTier::High];

    pub fn label(self) -> &'static str {
        match self {
            WindTier::Low => "Low",
            WindTier::Moderate => "Moderate",
            WindTier::High => "High",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    Ne,
    Se,
    Nw,
    Sw,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Ne, Quadrant::Se, Quadrant::Nw, Quadrant::Sw];

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::Ne => "NE",
            Quadrant::Se => "SE",
            Quadrant::Nw => "NW",
            Quadrant::Sw => "SW",
        }
    }
}

/// Wind speeds per intensity tier and compass quadrant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionalWinds {
    pub low_ne: f64,
    pub low_se: f64,
    pub low_nw: f64,
    pub low_sw: f64,
    pub moderate_ne: f64,
    pub moderate_se: f64,
    pub moderate_nw: f64,
    pub moderate_sw: f64,
    pub high_ne: f64,
    pub high_se: f64,
    pub high_nw: f64,
    pub high_sw: f64,
}

impl DirectionalWinds {
    pub fn uniform(low: f64, moderate: f64, high: f64) -> Self {
        Self {
            low_ne: low,
            low_se: low,
            low_nw: low,
            low_sw: low,
            moderate_ne: moderate,
            moderate_se: moderate,
            moderate_nw: moderate,
            moderate_sw: moderate,
            high_ne: high,
            high_se: high,
            high_nw: high,
            high_sw: high,
        }
    }

    pub fn get(&self, tier: WindTier, quadrant: Quadrant) -> f64 {
        match (tier, quadrant) {
            (WindTier::Low, Quadrant::Ne) => self.low_ne,
            (WindTier::Low, Quadrant::Se) => self.low_se,
            (WindTier::Low, Quadrant::Nw) => self.low_nw,
            (WindTier::Low, Quadrant::Sw) => self.low_sw,
            (WindTier::Moderate, Quadrant::Ne) => self.moderate_ne,
            (WindTier::Moderate, Quadrant::Se) => self.moderate_se,
            (WindTier::Moderate, Quadrant::Nw) => self.moderate_nw,
            (WindTier::Moderate, Quadrant::Sw) => self.moderate_sw,
            (WindTier::High, Quadrant::Ne) => self.high_ne,
            (WindTier::High, Quadrant::Se) => self.high_se,
            (WindTier::High, Quadrant::Nw) => self.high_nw,
            (WindTier::High, Quadrant::Sw) => self.high_sw,
        }
    }

    pub fn get_mut(&mut self, tier: WindTier, quadrant: Quadrant) -> &mut f64 {
        match (tier, quadrant) {
            (WindTier::Low, Quadrant::Ne) => &mut self.low_ne,
            (WindTier::Low, Quadrant::Se) => &mut self.low_se,
            (WindTier::Low, Quadrant::Nw) => &mut self.low_nw,
            (WindTier::Low, Quadrant::Sw) => &mut self.low_sw,
            (WindTier::Moderate, Quadrant::Ne) => &mut self.moderate_ne,
            (WindTier::Moderate, Quadrant::Se) => &mut self.moderate_se,
            (WindTier::Moderate, Quadrant::Nw) => &mut self.moderate_nw,
            (WindTier::Moderate, Quadrant::Sw) => &mut self.moderate_sw,
            (WindTier::High, Quadrant::Ne) => &mut self.high_ne,
            (WindTier::High, Quadrant::Se) => &mut self.high_se,
            (WindTier::High, Quadrant::Nw) => &mut self.high_nw,
            (WindTier::High, Quadrant::Sw) => &mut self.high_sw,
        }
    }

    /// All twelve fields in tier-major order.
    pub fn values(&self) -> [f64; 12] {
        [
            self.low_ne,
            self.low_se,
            self.low_nw,
            self.low_sw,
            self.moderate_ne,
            self.moderate_se,
            self.moderate_nw,
            self.moderate_sw,
            self.high_ne,
            self.high_se,
            self.high_nw,
            self.high_sw,
        ]
    }

    pub fn for_each_mut(&mut self, mut apply: impl FnMut(&mut f64)) {
        for tier in WindTier::ALL {
            for quadrant in Quadrant::ALL {
                apply(self.get_mut(tier, quadrant));
            }
        }
    }
}

pub fn wind_feature_name(tier: WindTier, quadrant: Quadrant) -> String {
    format!("{} Wind {}", tier.label(), quadrant.label())
}

/// The single simulated weather record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherState {
    pub center: Coordinates,
    pub max_wind: f64,
    pub min_pressure: f64,
    pub directional_winds: DirectionalWinds,
    pub cyclonic: bool,
    pub severity: f64,
    pub timestamp: DateTime<Utc>,
}

impl WeatherState {
    pub fn baseline(timestamp: DateTime<Utc>) -> Self {
        Self {
            center: Coordinates::new(BASELINE_LATITUDE_DEG, BASELINE_LONGITUDE_DEG),
            max_wind: BASELINE_MAX_WIND,
            min_pressure: BASELINE_PRESSURE_HPA,
            directional_winds: DirectionalWinds::uniform(
                BASELINE_LOW_WIND,
                BASELINE_MODERATE_WIND,
                BASELINE_HIGH_WIND,
            ),
            cyclonic: false,
            severity: 0.0,
            timestamp,
        }
    }

    /// Classifier feature vector keyed by the upstream column names.
    pub fn features(&self) -> BTreeMap<String, f64> {
        let mut features = BTreeMap::new();
        features.insert(FEATURE_LATITUDE.to_string(), self.center.latitude);
        features.insert(FEATURE_LONGITUDE.to_string(), self.center.longitude);
        features.insert(FEATURE_MAX_WIND.to_string(), self.max_wind);
        features.insert(FEATURE_MIN_PRESSURE.to_string(), self.min_pressure);
        for tier in WindTier::ALL {
            for quadrant in Quadrant::ALL {
                features.insert(
                    wind_feature_name(tier, quadrant),
                    self.directional_winds.get(tier, quadrant),
                );
            }
        }
        features
    }
}

/// Weather as last reported by the upstream feed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedSnapshot {
    pub observed_at: DateTime<Utc>,
    pub weather: WeatherState,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub hour: u32,
    pub timestamp: DateTime<Utc>,
    pub weather: WeatherState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Precaution,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Precaution => "precaution",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

/// Nested danger radii around the cyclone center, in km.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DangerZones {
    pub red_km: f64,
    pub orange_km: f64,
    pub yellow_km: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub level: AlertLevel,
    pub distance_km: f64,
    pub zones: DangerZones,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub test_mode: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub category: i64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedPrediction {
    pub observed_at: DateTime<Utc>,
    pub weather: WeatherState,
    pub prediction: Prediction,
}
