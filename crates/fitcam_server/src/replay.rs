//! Offline replay of recorded workout traces.
//!
//! A trace is a JSON-lines file, one step per line:
//!
//! ```text
//! {"configure": {"exercise": "SQUAT", "target_sets": 1, ...}}
//! {"press": "START"}
//! {"sample": {"x": 0.1, "y": 9.6, "z": 0.4, "captured_at": "2026-03-01T08:00:00.020Z"}}
//! {"utterance": "pause please"}
//! {"wait_secs": 3}
//! "save"
//! ```

use std::time::Duration;

use anyhow::Context;
use fitcam_core::{
    CommandEvent, MotionSample, ProgressSnapshot, SessionHandle, WorkoutConfiguration,
    WorkoutSessionRecord,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStep {
    Configure(WorkoutConfiguration),
    Press(CommandEvent),
    Utterance(String),
    Sample(MotionSample),
    WaitSecs(u64),
    Save,
}

#[derive(Debug, Serialize)]
pub struct ReplayOutcome {
    pub progress: ProgressSnapshot,
    pub saved: Option<WorkoutSessionRecord>,
    pub samples: usize,
}

pub fn parse_trace(text: &str) -> anyhow::Result<Vec<TraceStep>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(idx, line)| {
            serde_json::from_str::<TraceStep>(line)
                .with_context(|| format!("trace line {}", idx + 1))
        })
        .collect()
}

/// Feed every step to the session in order, waiting in real time on `wait_secs`.
pub async fn run_trace(
    session: &SessionHandle,
    steps: Vec<TraceStep>,
) -> anyhow::Result<ReplayOutcome> {
    let mut saved = None;
    let mut samples = 0;
    for step in steps {
        match step {
            TraceStep::Configure(config) => session.configure(config).await?,
            TraceStep::Press(command) => session.router().press(command).await?,
            TraceStep::Utterance(text) => {
                let command = session.router().route_utterance(&text).await?;
                debug!(%text, ?command, "replayed utterance");
            }
            TraceStep::Sample(sample) => {
                session.send_sample(sample).await?;
                samples += 1;
            }
            TraceStep::WaitSecs(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            TraceStep::Save => {
                let record = session.save().await?;
                info!(session_id = %record.session_id, "replayed session saved");
                saved = Some(record);
            }
        }
    }
    Ok(ReplayOutcome {
        progress: session.query_progress().await?,
        saved,
        samples,
    })
}
