use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::constants::SEVERITY_ALERT_SUBJECT;
use crate::error::{CycloneError, CycloneResult};
use crate::mail::Mailer;
use crate::notify::NotificationHub;
use crate::proximity::ProximityEngine;
use crate::state::WeatherStore;
use crate::types::{AlertLevel, Coordinates, DangerZones, WeatherState};

/// Result of a proximity check, whether or not an alert went out.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityReport {
    pub level: Option<AlertLevel>,
    pub distance_km: f64,
    pub zones: DangerZones,
    pub message: String,
    pub test_mode: bool,
    pub delivered: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlertOutcome {
    pub triggered: bool,
    pub message: String,
    pub email_error: Option<CycloneError>,
    pub live_delivered: usize,
}

pub struct AlertDispatcher {
    hub: Arc<NotificationHub>,
    mailer: Arc<dyn Mailer>,
    proximity: ProximityEngine,
    recipients: Vec<String>,
    severity_threshold: f64,
    send_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(
        hub: Arc<NotificationHub>,
        mailer: Arc<dyn Mailer>,
        proximity: ProximityEngine,
        recipients: Vec<String>,
        severity_threshold: f64,
        send_timeout: Duration,
    ) -> Self {
        Self {
            hub,
            mailer,
            proximity,
            recipients,
            severity_threshold,
            send_timeout,
        }
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    pub fn severity_threshold(&self) -> f64 {
        self.severity_threshold
    }

    /// Evaluates the observer against the cyclone and broadcasts any alert
    /// to live subscribers. Delivery failures never reach the caller.
    pub async fn check_proximity(
        &self,
        observer: Coordinates,
        weather: Option<&WeatherState>,
    ) -> CycloneResult<ProximityReport> {
        let assessment = self.proximity.assess(observer, weather)?;
        let test_mode = self.proximity.always_alert();

        let Some(event) = self.proximity.alert_for(&assessment, Utc::now()) else {
            return Ok(ProximityReport {
                level: None,
                distance_km: assessment.distance_km,
                zones: assessment.zones,
                message: "No alert necessary. You are outside the danger zone.".to_string(),
                test_mode,
                delivered: 0,
            });
        };

        let broadcast = self.hub.broadcast(&event.message).await;
        let test_note = if event.test_mode { " [TEST MODE]" } else { "" };
        info!(
            "{} proximity alert at {:.2} km broadcast to {} subscribers{}",
            event.level.as_str(),
            event.distance_km,
            broadcast.delivered,
            test_note
        );

        Ok(ProximityReport {
            level: Some(event.level),
            distance_km: event.distance_km,
            zones: event.zones,
            message: format!(
                "{} alert sent via in-app notification{test_note}.",
                capitalize(event.level.as_str())
            ),
            test_mode: event.test_mode,
            delivered: broadcast.delivered,
        })
    }

    /// Fires the email and live channels for a severity breach. The two
    /// channels run concurrently and fail independently.
    pub async fn raise_severity_alert(&self, weather: &WeatherState) -> AlertOutcome {
        let message = severity_message(weather);

        let email = async {
            match timeout(
                self.send_timeout,
                self.mailer
                    .send(&self.recipients, SEVERITY_ALERT_SUBJECT, &message),
            )
            .await
            {
                Ok(Ok(())) => None,
                Ok(Err(error)) => {
                    error!("Failed to send email alerts: {error:#}");
                    Some(CycloneError::Delivery(format!("{error:#}")))
                }
                Err(_) => {
                    error!("Email alert timed out after {:?}", self.send_timeout);
                    Some(CycloneError::Delivery(format!(
                        "email send timed out after {:?}",
                        self.send_timeout
                    )))
                }
            }
        };
        let live_text = message.replace('\n', " ");
        let live = self.hub.broadcast(&live_text);

        let (email_error, broadcast) = tokio::join!(email, live);
        AlertOutcome {
            triggered: true,
            message,
            email_error,
            live_delivered: broadcast.delivered,
        }
    }

    pub async fn check_severity(&self, weather: &WeatherState) -> AlertOutcome {
        if weather.severity > self.severity_threshold {
            return self.raise_severity_alert(weather).await;
        }
        AlertOutcome {
            triggered: false,
            message: "No severe weather detected.".to_string(),
            email_error: None,
            live_delivered: 0,
        }
    }
}

pub fn severity_message(weather: &WeatherState) -> String {
    format!(
        "A cyclonic condition has been detected in your area.\nLocation: Lat: {:.4}, Lon: {:.4}\nSeverity: {:.1}\nPlease take necessary precautions immediately.",
        weather.center.latitude, weather.center.longitude, weather.severity
    )
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Watches the simulated state and raises one severity alert per breach;
/// the latch re-arms once severity falls back to the threshold.
pub async fn severity_monitor_loop(
    store: Arc<WeatherStore>,
    dispatcher: Arc<AlertDispatcher>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut breached = false;
    loop {
        ticker.tick().await;
        let weather = store.read().await;
        let above = weather.severity > dispatcher.severity_threshold();
        if above && !breached {
            let outcome = dispatcher.raise_severity_alert(&weather).await;
            if let Some(error) = outcome.email_error {
                warn!("Severity alert email not delivered: {error}");
            }
        }
        breached = above;
    }
}
