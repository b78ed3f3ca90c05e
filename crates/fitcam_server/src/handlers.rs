use std::sync::Arc;

use axum::debug_handler;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use fitcam_core::observability::Health;
use fitcam_core::{
    CommandEvent, ExerciseKind, HistoryFilter, MotionSample, ProgressSnapshot, SaveStatus,
    WorkoutConfiguration, WorkoutSessionRecord,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{ServerError, ServerResult};

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: CommandEvent,
}

#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UtteranceResponse {
    pub command: Option<CommandEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SamplesResponse {
    pub accepted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveStatusResponse {
    pub status: SaveStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub exercise: Option<String>,
    pub date: Option<String>,
}

impl HistoryQuery {
    pub fn into_filter(self) -> ServerResult<HistoryFilter> {
        let exercise = self
            .exercise
            .filter(|e| !e.trim().is_empty())
            .map(|e| e.parse::<ExerciseKind>())
            .transpose()?;
        let date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                    .map_err(|e| ServerError::Validation(format!("date '{d}': {e}")))
            })
            .transpose()?;
        Ok(HistoryFilter { exercise, date })
    }
}

#[debug_handler]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = Health::readiness(state.session.is_alive());
    let status = if health.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

#[debug_handler]
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
pub async fn progress(State(state): State<Arc<AppState>>) -> ServerResult<Json<ProgressSnapshot>> {
    Ok(Json(state.session.query_progress().await?))
}

#[debug_handler]
pub async fn save_status(State(state): State<Arc<AppState>>) -> Json<SaveStatusResponse> {
    Json(SaveStatusResponse {
        status: state.session.save_status(),
    })
}

#[debug_handler]
pub async fn configure(
    State(state): State<Arc<AppState>>,
    Json(config): Json<WorkoutConfiguration>,
) -> ServerResult<Json<ProgressSnapshot>> {
    state.session.configure(config).await?;
    Ok(Json(state.session.query_progress().await?))
}

#[debug_handler]
pub async fn command(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommandRequest>,
) -> ServerResult<Json<ProgressSnapshot>> {
    state.session.router().press(req.command).await?;
    Ok(Json(state.session.query_progress().await?))
}

#[debug_handler]
pub async fn utterance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UtteranceRequest>,
) -> ServerResult<Json<UtteranceResponse>> {
    let command = state.session.router().route_utterance(&req.text).await?;
    Ok(Json(UtteranceResponse { command }))
}

#[debug_handler]
pub async fn samples(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<Vec<MotionSample>>,
) -> ServerResult<Json<SamplesResponse>> {
    let accepted = batch.len();
    for sample in batch {
        state.session.send_sample(sample).await?;
    }
    Ok(Json(SamplesResponse { accepted }))
}

#[debug_handler]
pub async fn save(
    State(state): State<Arc<AppState>>,
) -> ServerResult<(StatusCode, Json<WorkoutSessionRecord>)> {
    let record = state.session.save().await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[debug_handler]
pub async fn reset(State(state): State<Arc<AppState>>) -> ServerResult<Json<ProgressSnapshot>> {
    state.session.reset().await?;
    Ok(Json(state.session.query_progress().await?))
}

#[debug_handler]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ServerResult<Json<Vec<WorkoutSessionRecord>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.store.list_sessions(&filter).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_query_parses_filters() {
        let filter = HistoryQuery {
            exercise: Some("squat".into()),
            date: Some("2026-02-14".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.exercise, Some(ExerciseKind::Squat));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2026, 2, 14));

        let empty = HistoryQuery {
            exercise: Some(String::new()),
            date: None,
        }
        .into_filter()
        .unwrap();
        assert_eq!(empty, HistoryFilter::default());
    }

    #[test]
    fn history_query_rejects_bad_values() {
        assert!(
            HistoryQuery {
                exercise: Some("burpee".into()),
                date: None,
            }
            .into_filter()
            .is_err()
        );
        assert!(
            HistoryQuery {
                exercise: None,
                date: Some("14/02/2026".into()),
            }
            .into_filter()
            .is_err()
        );
    }
}
