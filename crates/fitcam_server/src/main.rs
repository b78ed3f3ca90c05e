use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use fitcam_core::config::AppConfig;
use fitcam_core::observability;
use fitcam_core::{SessionHandle, WorkoutConfiguration};
use fitcam_server::{AppState, logging, router};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_level = logging::init();
    info!(%log_level, "fitcam-server: log filter");

    let metrics = PrometheusBuilder::new().install_recorder()?;
    observability::describe_metrics();

    let config = AppConfig::from_env()?;
    let store = config.store.build()?;
    let session = SessionHandle::spawn(
        WorkoutConfiguration::default(),
        store.clone(),
        config.inbox_capacity,
    )?;
    info!(store = ?config.store, inbox_capacity = config.inbox_capacity, "session ready");

    let state = Arc::new(AppState {
        session,
        store,
        metrics,
    });

    let max_body_size = std::env::var("MAX_HTTP_BODY_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_BODY_SIZE);

    let app = router(state)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ));

    let addr: SocketAddr = std::env::var("ADDRESS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!(%addr, max_body_bytes = max_body_size, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
            info!("shutting down");
        })
        .await?;

    Ok(())
}
