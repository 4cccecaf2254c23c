use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use cyclone_alert::config::Config;
use cyclone_alert::utils::init_tracing;
use cyclone_alert::CycloneService;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::from_env()?;

    let http = Client::builder()
        .timeout(cfg.request_timeout)
        .user_agent("cyclone-alert/1.0")
        .build()
        .context("Failed to build reqwest client")?;

    let service = CycloneService::from_config(&cfg, http, None);
    let workers = service.spawn_workers(&cfg);

    let weather = service.current_state().await;
    info!(
        "Cyclone alert engine running; center ({:.2}, {:.2}), pressure {:.1} hPa",
        weather.center.latitude, weather.center.longitude, weather.min_pressure
    );

    shutdown_signal().await;
    info!("Shutting down");
    workers.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
