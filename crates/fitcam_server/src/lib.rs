//! HTTP surface over a single workout session.
//!
//! Buttons, speech transcripts and sensor batches arrive as requests and are
//! forwarded to the session task; progress and history are read back out.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use fitcam_core::{SessionHandle, SessionStore};
use metrics_exporter_prometheus::PrometheusHandle;

pub mod error;
pub mod handlers;
pub mod logging;
pub mod replay;

pub use error::{ServerError, ServerResult};

pub struct AppState {
    pub session: SessionHandle,
    pub store: Arc<dyn SessionStore>,
    pub metrics: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/progress", get(handlers::progress))
        .route("/save-status", get(handlers::save_status))
        .route("/configuration", put(handlers::configure))
        .route("/commands", post(handlers::command))
        .route("/utterances", post(handlers::utterance))
        .route("/samples", post(handlers::samples))
        .route("/save", post(handlers::save))
        .route("/reset", post(handlers::reset))
        .route("/history", get(handlers::history))
        .with_state(state)
}
