//! Drives a plank session with canned voice commands and prints the record.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fitcam_core::retry::RestartPolicy;
use fitcam_core::voice::{RecognitionOutcome, SpeechRecognizer, VoiceListener};
use fitcam_core::{
    ExerciseKind, InMemoryStore, SessionHandle, SessionState, WorkoutConfiguration,
};

struct Script(VecDeque<(Duration, RecognitionOutcome)>);

#[async_trait]
impl SpeechRecognizer for Script {
    async fn listen(&mut self) -> RecognitionOutcome {
        match self.0.pop_front() {
            Some((after, outcome)) => {
                tokio::time::sleep(after).await;
                outcome
            }
            None => std::future::pending().await,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = WorkoutConfiguration {
        exercise: ExerciseKind::Plank,
        target_sets: 1,
        target_reps: 1,
        target_duration_secs: 60,
        rest_secs: 0,
    };
    let session = SessionHandle::spawn(config, Arc::new(InMemoryStore::new()), 256)?;

    let script = Script(VecDeque::from([
        (Duration::from_millis(100), RecognitionOutcome::Utterance(vec!["start".into()])),
        (Duration::from_millis(500), RecognitionOutcome::NoMatch),
        (Duration::from_secs(3), RecognitionOutcome::Utterance(vec!["ok stop".into()])),
    ]));
    let listener = VoiceListener::spawn(script, session.router(), RestartPolicy::default());
    listener.start_listening();

    session.wait_for_state(SessionState::Stopped).await?;
    listener.destroy().await;

    let record = session.save().await?;
    println!(
        "{}: {}s held, stability {}",
        record.title(),
        record.total_duration_secs,
        record.stability_score
    );
    Ok(())
}
