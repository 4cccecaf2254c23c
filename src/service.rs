use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::alerts::{severity_monitor_loop, AlertDispatcher, AlertOutcome, ProximityReport};
use crate::config::Config;
use crate::error::{CycloneError, CycloneResult};
use crate::mail::{HttpMailRelay, LogMailer, Mailer};
use crate::notify::{LiveConnection, NotificationHub, SubscriberHandle};
use crate::prediction::{Classifier, PredictionGateway};
use crate::proximity::ProximityEngine;
use crate::scheduler::{spawn_background_workers, BackgroundWorkers, ObservedCache};
use crate::state::WeatherStore;
use crate::trend::TrendEngine;
use crate::types::{
    Coordinates, ForecastEntry, ObservedPrediction, Prediction, WeatherState,
};
use crate::upstream::{HttpWeatherSource, WeatherSource};

/// Operations the outer transport layer triggers.
pub struct CycloneService {
    store: Arc<WeatherStore>,
    observed: Arc<ObservedCache>,
    gateway: Option<PredictionGateway>,
    dispatcher: Arc<AlertDispatcher>,
    source: Option<Arc<dyn WeatherSource>>,
}

impl CycloneService {
    pub fn new(
        store: Arc<WeatherStore>,
        observed: Arc<ObservedCache>,
        gateway: Option<PredictionGateway>,
        dispatcher: Arc<AlertDispatcher>,
        source: Option<Arc<dyn WeatherSource>>,
    ) -> Self {
        Self {
            store,
            observed,
            gateway,
            dispatcher,
            source,
        }
    }

    pub fn from_config(
        cfg: &Config,
        http: Client,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        let store = Arc::new(WeatherStore::from_seed(
            TrendEngine::new(cfg.pressure_band),
            cfg.basin,
            cfg.rng_seed,
        ));

        let mailer: Arc<dyn Mailer> = match &cfg.mail_relay_url {
            Some(url) => Arc::new(HttpMailRelay::new(
                http.clone(),
                url.clone(),
                cfg.mail_api_key.clone(),
            )),
            None => {
                warn!("CYCLONE_MAIL_RELAY_URL is not set; severity emails will only be logged.");
                Arc::new(LogMailer)
            }
        };
        if cfg.always_alert {
            warn!("Always-alert test mode is enabled; every proximity check will alert.");
        }
        let dispatcher = Arc::new(AlertDispatcher::new(
            Arc::new(NotificationHub::new(cfg.send_timeout)),
            mailer,
            ProximityEngine::new(cfg.always_alert),
            cfg.alert_recipients.clone(),
            cfg.severity_threshold,
            cfg.send_timeout,
        ));

        let source = cfg.upstream_url.as_ref().map(|url| {
            info!("Upstream weather feed: {url}");
            Arc::new(HttpWeatherSource::new(http.clone(), url.clone())) as Arc<dyn WeatherSource>
        });
        if classifier.is_none() {
            warn!("No classifier loaded; prediction requests will be unavailable.");
        }

        Self::new(
            store,
            Arc::new(ObservedCache::default()),
            classifier.map(PredictionGateway::new),
            dispatcher,
            source,
        )
    }

    pub fn spawn_workers(&self, cfg: &Config) -> BackgroundWorkers {
        let mut workers = spawn_background_workers(
            self.store.clone(),
            cfg.tick_interval,
            self.source.clone(),
            self.observed.clone(),
            cfg.ingest_interval,
        );
        workers.monitor = Some(tokio::spawn(severity_monitor_loop(
            self.store.clone(),
            self.dispatcher.clone(),
            cfg.alert_check_interval,
        )));
        workers
    }

    pub async fn current_state(&self) -> WeatherState {
        self.store.read().await
    }

    pub async fn force_reset(&self) -> WeatherState {
        self.store.force_reset().await
    }

    pub async fn force_harsh(&self) -> WeatherState {
        self.store.force_harsh().await
    }

    pub async fn force_cyclonic(&self) -> WeatherState {
        self.store.force_cyclonic().await
    }

    pub async fn forecast(&self, hours: u32) -> CycloneResult<Vec<ForecastEntry>> {
        self.store.forecast(hours).await
    }

    pub fn predict(&self, features: &BTreeMap<String, f64>) -> CycloneResult<Prediction> {
        self.gateway()?.predict(features)
    }

    pub async fn predict_from_latest_observed(&self) -> CycloneResult<ObservedPrediction> {
        self.gateway()?
            .predict_from_latest_observed(&self.observed)
            .await
    }

    /// Uses the latest upstream observation. Without an upstream feed the
    /// simulated state stands in for it.
    pub async fn check_proximity(&self, observer: Coordinates) -> CycloneResult<ProximityReport> {
        let weather = match self.observed.latest().await {
            Some(snapshot) => Some(snapshot.weather),
            None if self.source.is_none() => Some(self.store.read().await),
            None => None,
        };
        self.dispatcher
            .check_proximity(observer, weather.as_ref())
            .await
    }

    pub async fn check_severity(&self) -> AlertOutcome {
        let weather = self.store.read().await;
        self.dispatcher.check_severity(&weather).await
    }

    pub async fn subscribe(&self, connection: Arc<dyn LiveConnection>) -> SubscriberHandle {
        self.dispatcher.hub().subscribe(connection).await
    }

    pub async fn unsubscribe(&self, handle: SubscriberHandle) {
        self.dispatcher.hub().unsubscribe(handle).await;
    }

    pub async fn handle_inbound(&self, handle: SubscriberHandle, text: &str) -> CycloneResult<()> {
        self.dispatcher.hub().handle_inbound(handle, text).await
    }

    pub fn observed(&self) -> &Arc<ObservedCache> {
        &self.observed
    }

    fn gateway(&self) -> CycloneResult<&PredictionGateway> {
        self.gateway
            .as_ref()
            .ok_or_else(|| CycloneError::Unavailable("No classifier loaded.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::notify::tests::RecordingConnection;
    use crate::prediction::tests::PressureClassifier;
    use crate::types::{AlertLevel, ObservedSnapshot};

    fn config() -> Config {
        Config {
            rng_seed: Some(99),
            alert_recipients: vec!["duty@example.com".to_string()],
            ..Config::default()
        }
    }

    fn service(cfg: &Config) -> CycloneService {
        CycloneService::from_config(cfg, Client::new(), Some(Arc::new(PressureClassifier::new())))
    }

    #[tokio::test]
    async fn reset_then_read_is_baseline() {
        let service = service(&config());
        service.force_harsh().await;
        service.force_reset().await;
        let weather = service.current_state().await;
        assert!(!weather.cyclonic);
        assert_eq!(weather.severity, 0.0);
        assert_eq!(weather.min_pressure, 1000.0);
    }

    #[tokio::test]
    async fn forecast_validates_horizon() {
        let service = service(&config());
        assert!(service.forecast(0).await.unwrap_err().is_validation());
        assert!(service.forecast(49).await.unwrap_err().is_validation());
        assert_eq!(service.forecast(6).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn proximity_uses_simulated_state_without_upstream_feed() {
        let service = service(&config());
        let subscriber = Arc::new(RecordingConnection::default());
        service.subscribe(subscriber.clone()).await;

        let weather = service.force_harsh().await;
        let report = service.check_proximity(weather.center).await.unwrap();
        assert_eq!(report.level, Some(AlertLevel::Critical));
        assert_eq!(subscriber.messages().len(), 1);
    }

    #[tokio::test]
    async fn proximity_is_unavailable_until_feed_delivers() {
        let cfg = Config {
            upstream_url: Some("http://127.0.0.1:9/current".to_string()),
            ..config()
        };
        let service = service(&cfg);
        let error = service
            .check_proximity(Coordinates::new(20.0, 80.0))
            .await
            .unwrap_err();
        assert!(error.is_retryable());
        assert!(service
            .predict_from_latest_observed()
            .await
            .unwrap_err()
            .is_retryable());

        let now = Utc::now();
        service
            .observed()
            .replace(ObservedSnapshot {
                observed_at: now,
                weather: WeatherState::baseline(now),
            })
            .await;
        let report = service
            .check_proximity(Coordinates::new(20.0, 80.0))
            .await
            .unwrap();
        assert_eq!(report.level, Some(AlertLevel::Critical));
        assert_eq!(
            service
                .predict_from_latest_observed()
                .await
                .unwrap()
                .prediction
                .category,
            0
        );
    }

    #[tokio::test]
    async fn prediction_without_classifier_is_unavailable() {
        let service = CycloneService::from_config(&config(), Client::new(), None);
        let features = WeatherState::baseline(Utc::now()).features();
        assert!(service.predict(&features).unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn severity_check_after_harsh_tick_triggers() {
        let service = service(&config());
        service.force_harsh().await;
        assert!(!service.check_severity().await.triggered);
        service.store.apply_tick().await;
        assert!(service.check_severity().await.triggered);
    }

    #[tokio::test]
    async fn inbound_echo_and_unsubscribe() {
        let service = service(&config());
        let subscriber = Arc::new(RecordingConnection::default());
        let handle = service.subscribe(subscriber.clone()).await;
        service.handle_inbound(handle, "status?").await.unwrap();
        assert_eq!(subscriber.messages(), vec!["Server received: status?".to_string()]);
        service.unsubscribe(handle).await;
        service.unsubscribe(handle).await;
        assert!(service.handle_inbound(handle, "again").await.is_err());
    }
}
