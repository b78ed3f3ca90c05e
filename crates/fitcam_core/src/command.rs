//! Voice and button commands merged into the session actor's inbox.

use tokio::sync::mpsc;
use tracing::debug;

use crate::FitcamError;
use crate::actor::SessionMessage;
use crate::observability;
use crate::types::CommandEvent;

const STOP_WORDS: &[&str] = &["stop", "finish"];
const PAUSE_WORDS: &[&str] = &["pause", "wait", "hold"];
const START_WORDS: &[&str] = &["start", "go", "resume"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandSource {
    Voice,
    Manual,
}

impl CommandSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandSource::Voice => "voice",
            CommandSource::Manual => "manual",
        }
    }
}

/// Map recognized speech to a command by substring keyword match.
///
/// Stop words win over pause words, which win over start words.
pub fn parse_utterance(text: &str) -> Option<CommandEvent> {
    let text = text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
    if mentions(STOP_WORDS) {
        Some(CommandEvent::Stop)
    } else if mentions(PAUSE_WORDS) {
        Some(CommandEvent::Pause)
    } else if mentions(START_WORDS) {
        Some(CommandEvent::Start)
    } else {
        None
    }
}

/// Cheap, cloneable entry point for every command producer.
///
/// All clones share one inbox, so the session sees a single ordered
/// command stream no matter which source a command came from.
#[derive(Clone, Debug)]
pub struct CommandRouter {
    inbox: mpsc::Sender<SessionMessage>,
}

impl CommandRouter {
    pub(crate) fn new(inbox: mpsc::Sender<SessionMessage>) -> Self {
        Self { inbox }
    }

    /// Button press; bypasses keyword matching.
    pub async fn press(&self, command: CommandEvent) -> Result<(), FitcamError> {
        self.submit(command, CommandSource::Manual).await
    }

    /// Recognized speech. Returns the command it mapped to, if any.
    pub async fn route_utterance(&self, text: &str) -> Result<Option<CommandEvent>, FitcamError> {
        let command = parse_utterance(text);
        match command {
            Some(command) => self.submit(command, CommandSource::Voice).await?,
            None => debug!(utterance = text, "no command keyword heard"),
        }
        Ok(command)
    }

    pub async fn submit(
        &self,
        command: CommandEvent,
        source: CommandSource,
    ) -> Result<(), FitcamError> {
        observability::record_command(command, source.as_str());
        self.inbox
            .send(SessionMessage::Command { command, source })
            .await
            .map_err(|_| FitcamError::ActorClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }
}
