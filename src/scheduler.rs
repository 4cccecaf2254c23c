use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::WeatherStore;
use crate::types::ObservedSnapshot;
use crate::upstream::WeatherSource;

/// Most recent observation ingested from upstream.
#[derive(Default)]
pub struct ObservedCache {
    latest: RwLock<Option<Arc<ObservedSnapshot>>>,
}

impl ObservedCache {
    pub async fn latest(&self) -> Option<Arc<ObservedSnapshot>> {
        self.latest.read().await.clone()
    }

    /// Every successful fetch wins, even when upstream stamps it earlier
    /// than the cached one.
    pub async fn replace(&self, snapshot: ObservedSnapshot) {
        let mut latest = self.latest.write().await;
        if let Some(current) = latest.as_ref() {
            if snapshot.observed_at < current.observed_at {
                warn!(
                    "Upstream timestamp went backwards ({} < {}); replacing anyway",
                    snapshot.observed_at, current.observed_at
                );
            }
        }
        *latest = Some(Arc::new(snapshot));
    }
}

pub async fn simulation_loop(store: Arc<WeatherStore>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let weather = store.apply_tick().await;
        debug!(
            "Simulation tick: pressure {:.2} hPa, severity {:.1}, cyclonic {}",
            weather.min_pressure, weather.severity, weather.cyclonic
        );
    }
}

pub async fn ingest_once(source: &dyn WeatherSource, cache: &ObservedCache) -> bool {
    match source.fetch().await {
        Ok(snapshot) => {
            let observed_at = snapshot.observed_at;
            cache.replace(snapshot).await;
            debug!("Ingested upstream weather observed at {observed_at}");
            true
        }
        Err(error) => {
            warn!("Upstream weather ingest failed: {error:#}");
            false
        }
    }
}

pub async fn ingest_loop(
    source: Arc<dyn WeatherSource>,
    cache: Arc<ObservedCache>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now(), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        ingest_once(source.as_ref(), &cache).await;
    }
}

pub struct BackgroundWorkers {
    pub simulation: JoinHandle<()>,
    pub ingest: Option<JoinHandle<()>>,
    pub monitor: Option<JoinHandle<()>>,
}

impl BackgroundWorkers {
    pub fn abort(&self) {
        self.simulation.abort();
        for handle in [&self.ingest, &self.monitor].into_iter().flatten() {
            handle.abort();
        }
    }
}

pub fn spawn_background_workers(
    store: Arc<WeatherStore>,
    tick_interval: Duration,
    source: Option<Arc<dyn WeatherSource>>,
    cache: Arc<ObservedCache>,
    ingest_interval: Duration,
) -> BackgroundWorkers {
    info!("Starting simulation loop every {:?}", tick_interval);
    let simulation = tokio::spawn(simulation_loop(store, tick_interval));

    let ingest = match source {
        Some(source) => {
            info!("Starting upstream ingest loop every {:?}", ingest_interval);
            Some(tokio::spawn(ingest_loop(source, cache, ingest_interval)))
        }
        None => {
            warn!("No upstream weather source configured; observed snapshot stays empty.");
            None
        }
    };

    BackgroundWorkers {
        simulation,
        ingest,
        monitor: None,
    }
}
