//! Speech recognizer driver.
//!
//! The listener owns the recognizer engine and loops one recognition
//! cycle after another while listening is enabled. Recognition failures
//! never leave this module: they only trigger a restart governed by a
//! [`RestartPolicy`]. Recognized text goes through [`CommandRouter`], so
//! the listener holds no session state.

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::CommandRouter;
use crate::observability;
use crate::retry::RestartPolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Candidate transcriptions, best first.
    Utterance(Vec<String>),
    NoMatch,
    Error(String),
}

#[async_trait]
pub trait SpeechRecognizer: Send + 'static {
    /// Run one listen cycle until a result or an error.
    async fn listen(&mut self) -> RecognitionOutcome;

    /// Release the engine. Called once when the listener is destroyed.
    async fn shutdown(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Listening,
    Stopped,
    Destroyed,
}

pub struct VoiceListener {
    state: watch::Sender<ListenerState>,
    task: JoinHandle<()>,
}

impl VoiceListener {
    /// Spawn the listener loop in the stopped state.
    pub fn spawn<R: SpeechRecognizer>(
        recognizer: R,
        router: CommandRouter,
        policy: RestartPolicy,
    ) -> Self {
        let (state, state_rx) = watch::channel(ListenerState::Stopped);
        let task = tokio::spawn(run_listener(recognizer, router, policy, state_rx));
        Self { state, task }
    }

    pub fn start_listening(&self) {
        self.set_state(ListenerState::Listening);
    }

    pub fn stop_listening(&self) {
        self.set_state(ListenerState::Stopped);
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Stop the loop, release the recognizer and wait for the task to end.
    pub async fn destroy(self) {
        self.set_state(ListenerState::Destroyed);
        if let Err(e) = self.task.await {
            warn!(error = %e, "voice listener task ended abnormally");
        }
    }

    fn set_state(&self, next: ListenerState) {
        self.state.send_if_modified(|current| {
            if *current == ListenerState::Destroyed || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

async fn run_listener<R: SpeechRecognizer>(
    mut recognizer: R,
    router: CommandRouter,
    policy: RestartPolicy,
    mut state: watch::Receiver<ListenerState>,
) {
    let mut failures = 0u32;
    loop {
        let current = *state.borrow_and_update();
        match current {
            ListenerState::Destroyed => break,
            ListenerState::Stopped => {
                failures = 0;
                if state.changed().await.is_err() {
                    break;
                }
                continue;
            }
            ListenerState::Listening => {}
        }

        let outcome = tokio::select! {
            outcome = recognizer.listen() => outcome,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        };

        match outcome {
            RecognitionOutcome::Utterance(candidates) => {
                failures = 0;
                let Some(best) = candidates.first() else {
                    continue;
                };
                debug!(utterance = %best, "heard");
                if router.route_utterance(best).await.is_err() {
                    info!("session closed; voice listener exiting");
                    break;
                }
            }
            failure => {
                failures += 1;
                observability::record_voice_restart();
                if let RecognitionOutcome::Error(reason) = &failure {
                    debug!(%reason, failures, "recognizer error; restarting");
                }
                match policy.delay_for(failures) {
                    Some(delay) => {
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            changed = state.changed() => {
                                if changed.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        warn!(failures, "recognizer keeps failing; waiting for restart");
                        if state.changed().await.is_err() {
                            break;
                        }
                        failures = 0;
                    }
                }
            }
        }
    }
    recognizer.shutdown().await;
    debug!("voice listener stopped");
}
