//! Tracing subscriber setup shared by both binaries.

use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "FITCAM_LOG_LEVEL";
const QUIET_DEPENDENCIES: &str = "hyper=warn,reqwest=warn";

/// `FITCAM_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_level_from<F>(get: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get(LOG_LEVEL_ENV)
        .or_else(|| get("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}

pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{log_level},{QUIET_DEPENDENCIES}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_DEPENDENCIES}")))
}

/// Install the global compact subscriber. Returns the level in effect.
pub fn init() -> String {
    let log_level = log_level_from(|k| std::env::var(k).ok());
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&log_level))
        .init();
    log_level
}
