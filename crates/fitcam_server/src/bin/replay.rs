//! `fitcam-replay <trace.jsonl>`: run a recorded trace through a fresh session
//! and print the outcome as JSON.

use anyhow::Context;
use fitcam_core::config::AppConfig;
use fitcam_core::{SessionHandle, WorkoutConfiguration};
use fitcam_server::logging;
use fitcam_server::replay::{parse_trace, run_trace};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    logging::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: fitcam-replay <trace.jsonl>")?;
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let steps = parse_trace(&text)?;
    tracing::info!(steps = steps.len(), %path, "replaying trace");

    let config = AppConfig::from_env()?;
    let session = SessionHandle::spawn(
        WorkoutConfiguration::default(),
        config.store.build()?,
        config.inbox_capacity,
    )?;
    let outcome = run_trace(&session, steps).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
