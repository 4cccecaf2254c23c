use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{SEVERITY_MAX, SEVERITY_MIN};
use crate::http_client::fetch_text;
use crate::types::{Coordinates, DirectionalWinds, ObservedSnapshot, WeatherState};
use crate::utils::clamp;

/// Source of observed weather, polled by the ingest loop.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> Result<ObservedSnapshot>;
}

/// Flat feed record, keyed by the upstream column names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Maximum Wind")]
    pub max_wind: f64,
    #[serde(rename = "Minimum Pressure")]
    pub min_pressure: f64,
    #[serde(rename = "Low Wind NE")]
    pub low_ne: f64,
    #[serde(rename = "Low Wind SE")]
    pub low_se: f64,
    #[serde(rename = "Low Wind NW")]
    pub low_nw: f64,
    #[serde(rename = "Low Wind SW")]
    pub low_sw: f64,
    #[serde(rename = "Moderate Wind NE")]
    pub moderate_ne: f64,
    #[serde(rename = "Moderate Wind SE")]
    pub moderate_se: f64,
    #[serde(rename = "Moderate Wind NW")]
    pub moderate_nw: f64,
    #[serde(rename = "Moderate Wind SW")]
    pub moderate_sw: f64,
    #[serde(rename = "High Wind NE")]
    pub high_ne: f64,
    #[serde(rename = "High Wind SE")]
    pub high_se: f64,
    #[serde(rename = "High Wind NW")]
    pub high_nw: f64,
    #[serde(rename = "High Wind SW")]
    pub high_sw: f64,
    #[serde(rename = "Cyclonic", default)]
    pub cyclonic: bool,
    #[serde(rename = "Cyclonic Severity", default)]
    pub severity: f64,
}

#[derive(Debug, Deserialize)]
struct FeedPayload {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    weather_data: WeatherReport,
}

impl WeatherReport {
    pub fn into_state(self, timestamp: DateTime<Utc>) -> Result<WeatherState> {
        let center = Coordinates::new(self.latitude, self.longitude);
        if !center.is_valid() {
            bail!(
                "Upstream cyclone center out of range: ({}, {})",
                self.latitude,
                self.longitude
            );
        }
        let numbers = [
            self.max_wind,
            self.min_pressure,
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
            self.severity,
        ];
        if numbers.iter().any(|value| !value.is_finite()) {
            bail!("Upstream weather report contains non-finite values");
        }

        let mut directional_winds = DirectionalWinds {
            low_ne: self.low_ne,
            low_se: self.low_se,
            low_nw: self.low_nw,
            low_sw: self.low_sw,
            moderate_ne: self.moderate_ne,
            moderate_se: self.moderate_se,
            moderate_nw: self.moderate_nw,
            moderate_sw: self.moderate_sw,
            high_ne: self.high_ne,
            high_se: self.high_se,
            high_nw: self.high_nw,
            high_sw: self.high_sw,
        };
        directional_winds.for_each_mut(|value| *value = value.max(0.0));

        Ok(WeatherState {
            center,
            max_wind: self.max_wind.max(0.0),
            min_pressure: self.min_pressure,
            directional_winds,
            cyclonic: self.cyclonic,
            severity: clamp(self.severity, SEVERITY_MIN, SEVERITY_MAX),
            timestamp,
        })
    }
}

pub fn parse_feed(body: &str, received_at: DateTime<Utc>) -> Result<ObservedSnapshot> {
    let payload: FeedPayload =
        serde_json::from_str(body).context("Failed to decode upstream weather payload")?;
    let observed_at = payload.timestamp.unwrap_or(received_at);
    Ok(ObservedSnapshot {
        observed_at,
        weather: payload.weather_data.into_state(observed_at)?,
    })
}

/// Pulls the latest report from an HTTP JSON feed.
pub struct HttpWeatherSource {
    http: Client,
    url: String,
}

impl HttpWeatherSource {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn fetch(&self) -> Result<ObservedSnapshot> {
        let body = fetch_text(&self.http, &self.url).await?;
        parse_feed(&body, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "timestamp": "2026-10-18T06:30:00Z",
        "weather_data": {
            "Latitude": 19.8, "Longitude": 85.9,
            "Maximum Wind": 180.0, "Minimum Pressure": 962.5,
            "Low Wind NE": 45.0, "Low Wind SE": 30.0, "Low Wind NW": 30.0, "Low Wind SW": -2.0,
            "Moderate Wind NE": 90.0, "Moderate Wind SE": 50.0, "Moderate Wind NW": 50.0, "Moderate Wind SW": 50.0,
            "High Wind NE": 140.0, "High Wind SE": 70.0, "High Wind NW": 70.0, "High Wind SW": 70.0,
            "Cyclonic": true, "Cyclonic Severity": 12.0
        }
    }"#;

    #[test]
    fn parses_feed_into_structured_record() {
        let snapshot = parse_feed(SAMPLE, Utc::now()).unwrap();
        assert_eq!(snapshot.observed_at.to_rfc3339(), "2026-10-18T06:30:00+00:00");
        let weather = snapshot.weather;
        assert_eq!(weather.center, Coordinates::new(19.8, 85.9));
        assert_eq!(weather.min_pressure, 962.5);
        assert_eq!(weather.directional_winds.high_ne, 140.0);
        assert_eq!(weather.directional_winds.low_sw, 0.0);
        assert_eq!(weather.severity, 10.0);
        assert!(weather.cyclonic);
    }

    #[test]
    fn missing_timestamp_falls_back_to_receive_time() {
        let body = SAMPLE.replace("\"timestamp\": \"2026-10-18T06:30:00Z\",", "");
        let received_at = Utc::now();
        let snapshot = parse_feed(&body, received_at).unwrap();
        assert_eq!(snapshot.observed_at, received_at);
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(parse_feed("{}", Utc::now()).is_err());
        let bad_center = SAMPLE.replace("\"Latitude\": 19.8", "\"Latitude\": 95.0");
        assert!(parse_feed(&bad_center, Utc::now()).is_err());
    }
}
