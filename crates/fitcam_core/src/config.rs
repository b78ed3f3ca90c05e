use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use crate::FitcamError;
use crate::http_store::HttpSessionStore;
use crate::store::{InMemoryStore, JsonlFileStore, SessionStore};

pub const DEFAULT_HISTORY_PATH: &str = "fitcam_history.jsonl";
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub enum StoreConfig {
    Memory,
    File { path: PathBuf },
    Http {
        base_url: String,
        token: Option<SecretString>,
    },
}

impl StoreConfig {
    pub fn build(&self) -> Result<Arc<dyn SessionStore>, FitcamError> {
        let store: Arc<dyn SessionStore> = match self {
            StoreConfig::Memory => Arc::new(InMemoryStore::new()),
            StoreConfig::File { path } => Arc::new(JsonlFileStore::new(path.clone())),
            StoreConfig::Http { base_url, token } => {
                Arc::new(HttpSessionStore::new(base_url, token.clone())?)
            }
        };
        Ok(store)
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub inbox_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, FitcamError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, FitcamError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let kind = get("FITCAM_STORE").unwrap_or_else(|| "memory".into());
        let store = match kind.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreConfig::Memory,
            "file" => StoreConfig::File {
                path: get("FITCAM_HISTORY_PATH")
                    .unwrap_or_else(|| DEFAULT_HISTORY_PATH.into())
                    .into(),
            },
            "http" => StoreConfig::Http {
                base_url: get("FITCAM_STORE_URL").ok_or_else(|| {
                    FitcamError::Config("FITCAM_STORE_URL missing for http store".into())
                })?,
                token: get("FITCAM_STORE_TOKEN")
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| SecretString::new(t.into())),
            },
            other => {
                return Err(FitcamError::Config(format!(
                    "unknown FITCAM_STORE kind: {other}"
                )));
            }
        };

        let inbox_capacity = match get("FITCAM_INBOX_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    FitcamError::Config(format!("FITCAM_INBOX_CAPACITY invalid: {raw}"))
                })?,
            None => DEFAULT_INBOX_CAPACITY,
        };

        Ok(Self {
            store,
            inbox_capacity,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::Memory,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}
