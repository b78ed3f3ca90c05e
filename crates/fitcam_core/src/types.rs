//! Data model shared by every component of the workout core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::FitcamError;

/// One raw accelerometer reading, in m/s².
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub captured_at: DateTime<Utc>,
}

impl MotionSample {
    pub fn new(x: f32, y: f32, z: f32, captured_at: DateTime<Utc>) -> Self {
        Self {
            x,
            y,
            z,
            captured_at,
        }
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseKind {
    PushUp,
    Squat,
    Plank,
}

impl ExerciseKind {
    /// Wire tag, e.g. `PUSH_UP`.
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::PushUp => "PUSH_UP",
            ExerciseKind::Squat => "SQUAT",
            ExerciseKind::Plank => "PLANK",
        }
    }

    /// Display title used on saved records, e.g. `PUSH UP`.
    pub fn title(self) -> &'static str {
        match self {
            ExerciseKind::PushUp => "PUSH UP",
            ExerciseKind::Squat => "SQUAT",
            ExerciseKind::Plank => "PLANK",
        }
    }

    pub fn is_rep_based(self) -> bool {
        !matches!(self, ExerciseKind::Plank)
    }
}

impl std::str::FromStr for ExerciseKind {
    type Err = FitcamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "PUSH_UP" => Ok(ExerciseKind::PushUp),
            "SQUAT" => Ok(ExerciseKind::Squat),
            "PLANK" => Ok(ExerciseKind::Plank),
            other => Err(FitcamError::InvalidWorkout(format!(
                "unknown exercise kind: {other}"
            ))),
        }
    }
}

/// Targets for one session. Fixed once the session leaves SETUP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfiguration {
    pub exercise: ExerciseKind,
    pub target_sets: u32,
    /// Reps per set; ignored for plank.
    pub target_reps: u32,
    /// Seconds per set; only used for plank.
    pub target_duration_secs: u64,
    pub rest_secs: u32,
}

impl Default for WorkoutConfiguration {
    fn default() -> Self {
        Self {
            exercise: ExerciseKind::PushUp,
            target_sets: 3,
            target_reps: 10,
            target_duration_secs: 30,
            rest_secs: 30,
        }
    }
}

impl WorkoutConfiguration {
    pub fn validate(&self) -> Result<(), FitcamError> {
        if self.target_sets < 1 {
            return Err(FitcamError::InvalidWorkout(
                "target_sets must be at least 1".into(),
            ));
        }
        if self.exercise.is_rep_based() && self.target_reps < 1 {
            return Err(FitcamError::InvalidWorkout(
                "target_reps must be at least 1".into(),
            ));
        }
        if self.exercise == ExerciseKind::Plank && self.target_duration_secs < 1 {
            return Err(FitcamError::InvalidWorkout(
                "target_duration_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Setup,
    Active,
    Paused,
    Resting,
    Finished,
    Stopped,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Stopped)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Setup => "SETUP",
            SessionState::Active => "ACTIVE",
            SessionState::Paused => "PAUSED",
            SessionState::Resting => "RESTING",
            SessionState::Finished => "FINISHED",
            SessionState::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Success,
    Error,
}

/// Control command, identical whether it came from voice or a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandEvent {
    Start,
    Pause,
    Stop,
}

impl CommandEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandEvent::Start => "START",
            CommandEvent::Pause => "PAUSE",
            CommandEvent::Stop => "STOP",
        }
    }
}

/// Per-set counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetProgress {
    pub current_set: u32,
    pub current_reps: u32,
    pub current_duration_secs: u64,
}

impl Default for SetProgress {
    fn default() -> Self {
        Self {
            current_set: 1,
            current_reps: 0,
            current_duration_secs: 0,
        }
    }
}

pub const POSTURE_READY: &str = "Ready";
pub const POSTURE_PAUSED: &str = "PAUSED";

/// Observable view of the session, republished after every relevant event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub state: SessionState,
    pub exercise: ExerciseKind,
    pub target_sets: u32,
    pub current_set: u32,
    pub current_reps: u32,
    pub current_duration_secs: u64,
    pub stability_score: u8,
    pub posture_label: String,
    pub rest_remaining_secs: u32,
}

/// Finalized session handed to the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSessionRecord {
    pub session_id: Uuid,
    pub exercise: ExerciseKind,
    pub total_reps: u32,
    pub total_duration_secs: u64,
    pub sets_completed: u32,
    pub stability_score: u8,
    pub completed_at: DateTime<Utc>,
}

impl WorkoutSessionRecord {
    pub fn title(&self) -> &'static str {
        self.exercise.title()
    }
}
