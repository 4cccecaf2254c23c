use std::time::Duration;

use anyhow::{Context, Result};

use crate::constants::{
    BASIN_LAT_MAX_DEG, BASIN_LAT_MIN_DEG, BASIN_LON_MAX_DEG, BASIN_LON_MIN_DEG,
    DEFAULT_ALERT_CHECK_INTERVAL_SECONDS, DEFAULT_INGEST_INTERVAL_SECONDS,
    DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_SEND_TIMEOUT_SECONDS, DEFAULT_SEVERITY_THRESHOLD,
    DEFAULT_TICK_INTERVAL_SECONDS, PRESSURE_BAND_MAX_HPA, PRESSURE_BAND_MIN_HPA,
};

/// Allowed range for the simulated minimum pressure, in hPa.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureBand {
    pub min_hpa: f64,
    pub max_hpa: f64,
}

impl Default for PressureBand {
    fn default() -> Self {
        Self {
            min_hpa: PRESSURE_BAND_MIN_HPA,
            max_hpa: PRESSURE_BAND_MAX_HPA,
        }
    }
}

impl PressureBand {
    pub fn clamp(&self, pressure_hpa: f64) -> f64 {
        pressure_hpa.max(self.min_hpa).min(self.max_hpa)
    }

    pub fn contains(&self, pressure_hpa: f64) -> bool {
        (self.min_hpa..=self.max_hpa).contains(&pressure_hpa)
    }
}

/// Ocean basin the cyclone center is placed in on reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasinBox {
    pub lat_min_deg: f64,
    pub lat_max_deg: f64,
    pub lon_min_deg: f64,
    pub lon_max_deg: f64,
}

impl Default for BasinBox {
    fn default() -> Self {
        Self {
            lat_min_deg: BASIN_LAT_MIN_DEG,
            lat_max_deg: BASIN_LAT_MAX_DEG,
            lon_min_deg: BASIN_LON_MIN_DEG,
            lon_max_deg: BASIN_LON_MAX_DEG,
        }
    }
}

impl BasinBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min_deg..=self.lat_max_deg).contains(&latitude)
            && (self.lon_min_deg..=self.lon_max_deg).contains(&longitude)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub tick_interval: Duration,
    pub ingest_interval: Duration,
    pub alert_check_interval: Duration,
    pub send_timeout: Duration,
    pub request_timeout: Duration,
    pub severity_threshold: f64,
    pub upstream_url: Option<String>,
    pub mail_relay_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub alert_recipients: Vec<String>,
    pub always_alert: bool,
    pub rng_seed: Option<u64>,
    pub pressure_band: PressureBand,
    pub basin: BasinBox,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECONDS),
            ingest_interval: Duration::from_secs(DEFAULT_INGEST_INTERVAL_SECONDS),
            alert_check_interval: Duration::from_secs(DEFAULT_ALERT_CHECK_INTERVAL_SECONDS),
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECONDS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            severity_threshold: DEFAULT_SEVERITY_THRESHOLD,
            upstream_url: None,
            mail_relay_url: None,
            mail_api_key: None,
            alert_recipients: Vec::new(),
            always_alert: false,
            rng_seed: None,
            pressure_band: PressureBand::default(),
            basin: BasinBox::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let tick_interval = Duration::from_secs(env_u64(
            "CYCLONE_TICK_INTERVAL_SECONDS",
            DEFAULT_TICK_INTERVAL_SECONDS,
        )?);
        let ingest_interval = Duration::from_secs(env_u64(
            "CYCLONE_INGEST_INTERVAL_SECONDS",
            DEFAULT_INGEST_INTERVAL_SECONDS,
        )?);
        let alert_check_interval = Duration::from_secs(env_u64(
            "CYCLONE_ALERT_CHECK_INTERVAL_SECONDS",
            DEFAULT_ALERT_CHECK_INTERVAL_SECONDS,
        )?);
        let send_timeout = Duration::from_secs(env_u64(
            "CYCLONE_SEND_TIMEOUT_SECONDS",
            DEFAULT_SEND_TIMEOUT_SECONDS,
        )?);
        let request_timeout = Duration::from_secs(env_u64(
            "CYCLONE_REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?);
        let severity_threshold =
            env_f64("CYCLONE_SEVERITY_THRESHOLD", DEFAULT_SEVERITY_THRESHOLD)?;
        let upstream_url = env_optional("CYCLONE_UPSTREAM_URL").map(|value| trim_base_url(&value));
        let mail_relay_url = env_optional("CYCLONE_MAIL_RELAY_URL");
        let mail_api_key = env_optional("CYCLONE_MAIL_API_KEY");
        let alert_recipients = parse_recipients(
            &env_optional("CYCLONE_ALERT_RECIPIENTS").unwrap_or_default(),
        );
        let always_alert = env_bool("CYCLONE_ALWAYS_ALERT", false)?;
        let rng_seed = match env_optional("CYCLONE_RNG_SEED") {
            Some(value) => Some(
                value
                    .parse::<u64>()
                    .with_context(|| format!("Failed to parse CYCLONE_RNG_SEED={} as u64", value))?,
            ),
            None => None,
        };

        Ok(Self {
            tick_interval,
            ingest_interval,
            alert_check_interval,
            send_timeout,
            request_timeout,
            severity_threshold,
            upstream_url,
            mail_relay_url,
            mail_api_key,
            alert_recipients,
            always_alert,
            rng_seed,
            pressure_band: PressureBand::default(),
            basin: BasinBox::default(),
        })
    }
}

fn trim_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

fn parse_recipients(value: &str) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for entry in value.split(',').map(str::trim) {
        if entry.is_empty() || recipients.iter().any(|existing| existing == entry) {
            continue;
        }
        recipients.push(entry.to_string());
    }
    recipients
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match env_optional(name) {
        Some(value) => value
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {}={} as u64", name, value)),
        None => Ok(default),
    }
}

fn env_f64(name: &str, default: f64) -> Result<f64> {
    match env_optional(name) {
        Some(value) => value
            .parse::<f64>()
            .with_context(|| format!("Failed to parse {}={} as f64", name, value)),
        None => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> Result<bool> {
    match env_optional(name) {
        Some(value) => parse_bool(&value)
            .with_context(|| format!("Failed to parse {}={} as bool", name, value)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognized boolean {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_are_trimmed_and_deduplicated() {
        assert_eq!(
            parse_recipients(" ops@example.com, ,duty@example.com,ops@example.com "),
            vec!["ops@example.com".to_string(), "duty@example.com".to_string()]
        );
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("on").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn pressure_band_clamps_into_range() {
        let band = PressureBand::default();
        assert_eq!(band.clamp(850.0), 900.0);
        assert_eq!(band.clamp(1050.0), 1020.0);
        assert_eq!(band.clamp(990.0), 990.0);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        assert_eq!(trim_base_url(" http://feed.local/ "), "http://feed.local");
    }
}
