//! Phone-sensor workout core: orientation checks, rep and plank detection,
//! and a timer-driven session state machine owned by a single async task.

use thiserror::Error;

pub mod actor;
pub mod command;
pub mod config;
pub mod filter;
pub mod http_store;
pub mod observability;
pub mod orientation;
pub mod plank;
pub mod reps;
pub mod retry;
pub mod session;
pub mod store;
pub mod timer;
pub mod types;
pub mod voice;

pub use actor::SessionHandle;
pub use command::{CommandRouter, CommandSource, parse_utterance};
pub use store::{HistoryFilter, InMemoryStore, JsonlFileStore, SessionStore};
pub use types::{
    CommandEvent, ExerciseKind, MotionSample, ProgressSnapshot, SaveStatus, SessionState,
    WorkoutConfiguration, WorkoutSessionRecord,
};

#[derive(Debug, Error)]
pub enum FitcamError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid workout: {0}")]
    InvalidWorkout(String),
    #[error("cannot {action} while session is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("session already saved")]
    AlreadySaved,
    #[error("session task is not running")]
    ActorClosed,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("store responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FitcamError {
    pub fn from_status(status: u16, body: String) -> Self {
        FitcamError::Status { status, body }
    }

    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            FitcamError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            FitcamError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
