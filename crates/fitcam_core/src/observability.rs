//! Metric names and small recording helpers shared by the core and the server.

use serde::{Deserialize, Serialize};

use crate::types::{CommandEvent, ExerciseKind, SaveStatus};

pub const REPS_COUNTED: &str = "fitcam_reps_counted_total";
pub const SETS_COMPLETED: &str = "fitcam_sets_completed_total";
pub const COMMANDS_ROUTED: &str = "fitcam_commands_routed_total";
pub const COMMANDS_DISCARDED: &str = "fitcam_commands_discarded_total";
pub const SAMPLES_DROPPED: &str = "fitcam_samples_dropped_total";
pub const VOICE_RESTARTS: &str = "fitcam_voice_restarts_total";
pub const SAVES: &str = "fitcam_saves_total";

/// Register help text for every counter with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(REPS_COUNTED, "Repetitions counted by the rep detector");
    metrics::describe_counter!(SETS_COMPLETED, "Sets that reached their target");
    metrics::describe_counter!(COMMANDS_ROUTED, "Commands submitted by voice or buttons");
    metrics::describe_counter!(
        COMMANDS_DISCARDED,
        "Commands with no transition from the current state"
    );
    metrics::describe_counter!(SAMPLES_DROPPED, "Sensor samples dropped before detection");
    metrics::describe_counter!(VOICE_RESTARTS, "Speech recognizer restarts after a failed cycle");
    metrics::describe_counter!(SAVES, "Finished save attempts by outcome");
}

pub fn record_rep(exercise: ExerciseKind) {
    metrics::counter!(REPS_COUNTED, "exercise" => exercise.title()).increment(1);
}

pub fn record_set_completed(exercise: ExerciseKind) {
    metrics::counter!(SETS_COMPLETED, "exercise" => exercise.title()).increment(1);
}

pub fn record_command(command: CommandEvent, source: &'static str) {
    metrics::counter!(COMMANDS_ROUTED, "command" => command.as_str(), "source" => source)
        .increment(1);
}

pub fn record_discarded_command(command: CommandEvent) {
    metrics::counter!(COMMANDS_DISCARDED, "command" => command.as_str()).increment(1);
}

pub fn record_dropped_sample(reason: &'static str) {
    metrics::counter!(SAMPLES_DROPPED, "reason" => reason).increment(1);
}

pub fn record_voice_restart() {
    metrics::counter!(VOICE_RESTARTS).increment(1);
}

pub fn record_save(status: SaveStatus) {
    let outcome = match status {
        SaveStatus::Success => "success",
        SaveStatus::Error => "error",
        SaveStatus::Saving => "saving",
        SaveStatus::Idle => "idle",
    };
    metrics::counter!(SAVES, "outcome" => outcome).increment(1);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub ready: bool,
}

impl Health {
    /// Ready while the session actor still accepts messages.
    pub fn readiness(actor_alive: bool) -> Self {
        Self { ready: actor_alive }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_follows_actor() {
        assert!(Health::readiness(true).ready);
        assert!(!Health::readiness(false).ready);
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_rep(ExerciseKind::Squat);
        record_save(SaveStatus::Error);
        record_command(CommandEvent::Stop, "voice");
        describe_metrics();
    }
}
