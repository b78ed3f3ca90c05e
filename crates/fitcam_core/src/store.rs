//! Persistence collaborator for finished sessions.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::FitcamError;
use crate::types::{ExerciseKind, WorkoutSessionRecord};

/// History query: optional exercise kind and optional UTC calendar day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub exercise: Option<ExerciseKind>,
    pub date: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &WorkoutSessionRecord) -> bool {
        self.exercise.is_none_or(|kind| record.exercise == kind)
            && self
                .date
                .is_none_or(|day| record.completed_at.date_naive() == day)
    }

    /// Filter in place and order newest first.
    pub fn apply(&self, mut records: Vec<WorkoutSessionRecord>) -> Vec<WorkoutSessionRecord> {
        records.retain(|r| self.matches(r));
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        records
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn save_session(&self, record: &WorkoutSessionRecord) -> Result<(), FitcamError>;

    /// Stored sessions matching `filter`, newest first.
    async fn list_sessions(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<WorkoutSessionRecord>, FitcamError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<WorkoutSessionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn save_session(&self, record: &WorkoutSessionRecord) -> Result<(), FitcamError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.session_id == record.session_id) {
            return Ok(());
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_sessions(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<WorkoutSessionRecord>, FitcamError> {
        let records = self.records.lock().await.clone();
        Ok(filter.apply(records))
    }
}

/// Append-only JSON lines file, one record per line.
#[derive(Debug)]
pub struct JsonlFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<WorkoutSessionRecord>, FitcamError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WorkoutSessionRecord>(line) {
                Ok(record) if seen.insert(record.session_id) => records.push(record),
                Ok(record) => debug!(session_id = %record.session_id, "skipping duplicate history line"),
                Err(e) => warn!(line = line_no + 1, error = %e, "skipping corrupt history line"),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl SessionStore for JsonlFileStore {
    async fn save_session(&self, record: &WorkoutSessionRecord) -> Result<(), FitcamError> {
        let _guard = self.write_lock.lock().await;
        let existing = self.read_all().await?;
        if existing.iter().any(|r| r.session_id == record.session_id) {
            debug!(session_id = %record.session_id, "session already on disk");
            return Ok(());
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn list_sessions(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<WorkoutSessionRecord>, FitcamError> {
        let _guard = self.write_lock.lock().await;
        Ok(filter.apply(self.read_all().await?))
    }
}
