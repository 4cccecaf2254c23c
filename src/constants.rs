pub const REFERENCE_SEA_LEVEL_PRESSURE_HPA: f64 = 1013.0;
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const PRESSURE_BAND_MIN_HPA: f64 = 900.0;
pub const PRESSURE_BAND_MAX_HPA: f64 = 1020.0;
pub const BASIN_LAT_MIN_DEG: f64 = 8.0;
pub const BASIN_LAT_MAX_DEG: f64 = 37.0;
pub const BASIN_LON_MIN_DEG: f64 = 68.0;
pub const BASIN_LON_MAX_DEG: f64 = 97.0;

pub const CYCLONE_ONSET_PRESSURE_HPA: f64 = 980.0;
pub const CYCLONE_DISSIPATION_PRESSURE_HPA: f64 = 995.0;
pub const SEVERITY_MIN: f64 = 0.0;
pub const SEVERITY_MAX: f64 = 10.0;
pub const SEVERITY_STEP: f64 = 0.1;

pub const CYCLONIC_PRESSURE_DROP_MIN_HPA: f64 = 0.5;
pub const CYCLONIC_PRESSURE_DROP_MAX_HPA: f64 = 1.0;
pub const CALM_PRESSURE_DRIFT_MIN_HPA: f64 = -0.2;
pub const CALM_PRESSURE_DRIFT_MAX_HPA: f64 = 0.5;
pub const TICK_WIND_JITTER: f64 = 0.1;

pub const FORECAST_MIN_HOURS: u32 = 1;
pub const FORECAST_MAX_HOURS: u32 = 48;
pub const FORECAST_PRESSURE_JITTER_HPA: f64 = 0.3;
pub const FORECAST_WIND_JITTER: f64 = 0.5;

pub const BASELINE_LATITUDE_DEG: f64 = 20.0;
pub const BASELINE_LONGITUDE_DEG: f64 = 80.0;
pub const BASELINE_MAX_WIND: f64 = 100.0;
pub const BASELINE_PRESSURE_HPA: f64 = 1000.0;
pub const BASELINE_LOW_WIND: f64 = 30.0;
pub const BASELINE_MODERATE_WIND: f64 = 50.0;
pub const BASELINE_HIGH_WIND: f64 = 70.0;

pub const HARSH_PRESSURE_HPA: f64 = 960.0;
pub const HARSH_MAX_WIND: f64 = 200.0;
pub const HARSH_SEVERITY: f64 = 7.0;
pub const HARSH_LOW_WIND_NE: f64 = 50.0;
pub const HARSH_MODERATE_WIND_NE: f64 = 100.0;
pub const HARSH_HIGH_WIND_NE: f64 = 150.0;
pub const HARSH_OFFSET_MIN_DEG: f64 = 0.18;
pub const HARSH_OFFSET_MAX_DEG: f64 = 0.27;
pub const SIMULATED_CYCLONE_PRESSURE_HPA: f64 = 970.0;

pub const RED_ZONE_BASE_KM: f64 = 10.0;
pub const RED_ZONE_KM_PER_SEVERITY: f64 = 5.0;
pub const RED_ZONE_KM_PER_WIND: f64 = 0.1;
pub const ORANGE_ZONE_FACTOR: f64 = 2.0;
pub const YELLOW_ZONE_FACTOR: f64 = 3.0;

pub const DEFAULT_TICK_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_INGEST_INTERVAL_SECONDS: u64 = 10;
pub const DEFAULT_ALERT_CHECK_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_SEND_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_SEVERITY_THRESHOLD: f64 = 7.0;

pub const SEVERITY_ALERT_SUBJECT: &str = "Cyclone Alert: Severe Weather Detected!";
pub const UNKNOWN_STATUS_DESCRIPTION: &str = "Unknown cyclone status.";
pub const CYCLONE_STATUS_DESCRIPTIONS: [&str; 10] = [
    "No cyclone is expected in this area.",
    "Tropical Depression: Weak cyclone; minimal impact expected.",
    "Tropical Storm: Moderate cyclone; potential for rain and strong winds.",
    "Hurricane: Severe cyclone; prepare for heavy rain, strong winds, and damage.",
    "Extratropical Cyclone: Cyclone formed outside the tropics; strong winds possible.",
    "Subtropical Depression: Weak storm; limited impact expected.",
    "Subtropical Storm: Moderate storm; expect rain and moderate winds.",
    "Low Pressure: Localized low-pressure system; no major impact.",
    "Tropical Wave: Weak atmospheric wave; no immediate threat.",
    "Disturbance: Weather disturbance; unlikely to develop into a cyclone.",
];
