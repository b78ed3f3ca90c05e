//! Single-writer session task.
//!
//! ```text
//! sensor ──push_sample──┐
//! voice ──CommandRouter─┼──▶ inbox (mpsc) ──┐
//! buttons ──────────────┘                    ├──▶ SessionActor::run ──▶ progress (watch)
//! TimerService ──────────▶ ticks (mpsc) ─────┘          │             save status (watch)
//!                                                        └──▶ SessionStore (spawned save)
//! ```
//!
//! One task owns the [`SessionStateMachine`] and the [`TimerService`].
//! Each message is applied to completion, timer effects included, before
//! the next one is taken, so samples, ticks and commands never race.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

use crate::FitcamError;
use crate::command::{CommandRouter, CommandSource};
use crate::observability;
use crate::session::{SessionEvent, SessionStateMachine, TimerEffect};
use crate::store::SessionStore;
use crate::timer::{TimerKind, TimerService, TimerTick};
use crate::types::{
    CommandEvent, MotionSample, ProgressSnapshot, SaveStatus, SessionState, WorkoutConfiguration,
    WorkoutSessionRecord,
};

type Reply<T> = oneshot::Sender<Result<T, FitcamError>>;

pub(crate) enum SessionMessage {
    Command {
        command: CommandEvent,
        source: CommandSource,
    },
    Sample(MotionSample),
    Configure {
        config: WorkoutConfiguration,
        reply: Reply<()>,
    },
    Save {
        reply: Reply<WorkoutSessionRecord>,
    },
    SaveFinished {
        generation: u64,
        record: WorkoutSessionRecord,
        result: Result<(), FitcamError>,
        reply: Reply<WorkoutSessionRecord>,
    },
    Reset {
        reply: Reply<()>,
    },
    Query {
        reply: oneshot::Sender<ProgressSnapshot>,
    },
}

struct SessionActor {
    machine: SessionStateMachine,
    timers: TimerService,
    ticks: mpsc::Receiver<TimerTick>,
    inbox: mpsc::Receiver<SessionMessage>,
    loopback: mpsc::WeakSender<SessionMessage>,
    store: Arc<dyn SessionStore>,
    progress: watch::Sender<ProgressSnapshot>,
    save_status: watch::Sender<SaveStatus>,
    save_generation: u64,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                Some(tick) = self.ticks.recv() => self.on_tick(tick),
                message = self.inbox.recv() => match message {
                    Some(message) => self.on_message(message),
                    None => break,
                },
            }
            self.publish();
        }
        self.timers.cancel_all();
        debug!("session actor stopped");
    }

    fn on_tick(&mut self, tick: TimerTick) {
        if !self.timers.accepts(&tick) {
            trace!(?tick, "stale timer tick dropped");
            return;
        }
        let event = match tick.kind {
            TimerKind::Active => SessionEvent::ActiveTick,
            TimerKind::Rest => SessionEvent::RestTick,
        };
        let effects = self.machine.handle(event);
        self.apply(effects);
    }

    fn on_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Command { command, source } => {
                debug!(
                    command = command.as_str(),
                    source = source.as_str(),
                    state = %self.machine.state(),
                    "command received"
                );
                let effects = self.machine.handle(SessionEvent::Command(command));
                self.apply(effects);
            }
            SessionMessage::Sample(sample) => {
                let effects = self.machine.handle(SessionEvent::Sample(sample));
                self.apply(effects);
            }
            SessionMessage::Configure { config, reply } => {
                let _ = reply.send(self.machine.configure(config));
            }
            SessionMessage::Save { reply } => self.begin_save(reply),
            SessionMessage::SaveFinished {
                generation,
                record,
                result,
                reply,
            } => self.finish_save(generation, record, result, reply),
            SessionMessage::Reset { reply } => {
                let outcome = self.machine.reset().map(|effects| {
                    self.apply(effects);
                    self.save_generation += 1;
                    self.save_status.send_replace(SaveStatus::Idle);
                });
                let _ = reply.send(outcome);
            }
            SessionMessage::Query { reply } => {
                let _ = reply.send(self.machine.snapshot());
            }
        }
    }

    fn apply(&mut self, effects: Vec<TimerEffect>) {
        for effect in effects {
            match effect {
                TimerEffect::Start(kind) => {
                    self.timers.start(kind);
                }
                TimerEffect::Cancel(kind) => {
                    self.timers.cancel(kind);
                }
            }
        }
    }

    fn begin_save(&mut self, reply: Reply<WorkoutSessionRecord>) {
        let status = *self.save_status.borrow();
        match status {
            SaveStatus::Saving => {
                let _ = reply.send(Err(FitcamError::SaveInProgress));
                return;
            }
            SaveStatus::Success => {
                let _ = reply.send(Err(FitcamError::AlreadySaved));
                return;
            }
            SaveStatus::Idle | SaveStatus::Error => {}
        }
        let record = match self.machine.record() {
            Ok(record) => record,
            Err(e) => {
                let _ = reply.send(Err(e));
                return;
            }
        };
        let Some(loopback) = self.loopback.upgrade() else {
            let _ = reply.send(Err(FitcamError::ActorClosed));
            return;
        };

        self.save_status.send_replace(SaveStatus::Saving);
        let generation = self.save_generation;
        let store = self.store.clone();
        info!(session_id = %record.session_id, "saving workout session");
        tokio::spawn(async move {
            let result = store.save_session(&record).await;
            let message = SessionMessage::SaveFinished {
                generation,
                record,
                result,
                reply,
            };
            if let Err(mpsc::error::SendError(message)) = loopback.send(message).await {
                if let SessionMessage::SaveFinished { reply, .. } = message {
                    let _ = reply.send(Err(FitcamError::ActorClosed));
                }
            }
        });
    }

    fn finish_save(
        &mut self,
        generation: u64,
        record: WorkoutSessionRecord,
        result: Result<(), FitcamError>,
        reply: Reply<WorkoutSessionRecord>,
    ) {
        let status = if result.is_ok() {
            SaveStatus::Success
        } else {
            SaveStatus::Error
        };
        observability::record_save(status);
        match &result {
            Ok(()) => info!(session_id = %record.session_id, "workout session saved"),
            Err(e) => warn!(session_id = %record.session_id, error = %e, "saving workout session failed"),
        }
        // a reset while the save was in flight already cleared the status
        if generation == self.save_generation {
            self.save_status.send_replace(status);
        }
        let _ = reply.send(result.map(|()| record));
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.progress.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    inbox: mpsc::Sender<SessionMessage>,
    progress: watch::Receiver<ProgressSnapshot>,
    save_status: watch::Receiver<SaveStatus>,
}

impl SessionHandle {
    /// Spawn the session task on the current tokio runtime.
    pub fn spawn(
        config: WorkoutConfiguration,
        store: Arc<dyn SessionStore>,
        inbox_capacity: usize,
    ) -> Result<Self, FitcamError> {
        let machine = SessionStateMachine::new(config)?;
        let (inbox_tx, inbox_rx) = mpsc::channel(inbox_capacity.max(1));
        let (tick_tx, tick_rx) = mpsc::channel(8);
        let (progress_tx, progress_rx) = watch::channel(machine.snapshot());
        let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);

        let actor = SessionActor {
            machine,
            timers: TimerService::new(tick_tx),
            ticks: tick_rx,
            inbox: inbox_rx,
            loopback: inbox_tx.downgrade(),
            store,
            progress: progress_tx,
            save_status: status_tx,
            save_generation: 0,
        };
        tokio::spawn(actor.run());

        Ok(Self {
            inbox: inbox_tx,
            progress: progress_rx,
            save_status: status_rx,
        })
    }

    /// Command entry point shared by voice recognition and buttons.
    pub fn router(&self) -> CommandRouter {
        CommandRouter::new(self.inbox.clone())
    }

    /// Best-effort sample delivery; drops the sample when the inbox is full.
    pub fn push_sample(&self, sample: MotionSample) -> bool {
        match self.inbox.try_send(SessionMessage::Sample(sample)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("session inbox full; sample dropped");
                observability::record_dropped_sample("inbox_full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Lossless sample delivery, waiting for inbox space.
    pub async fn send_sample(&self, sample: MotionSample) -> Result<(), FitcamError> {
        self.send(SessionMessage::Sample(sample)).await
    }

    /// Forward a live sensor stream until it ends or the session goes away.
    /// Returns the number of samples accepted.
    pub async fn pump_samples<S>(&self, samples: S) -> usize
    where
        S: Stream<Item = MotionSample>,
    {
        futures_util::pin_mut!(samples);
        let mut accepted = 0;
        while let Some(sample) = samples.next().await {
            if self.push_sample(sample) {
                accepted += 1;
            } else if self.inbox.is_closed() {
                break;
            }
        }
        accepted
    }

    pub async fn configure(&self, config: WorkoutConfiguration) -> Result<(), FitcamError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Configure { config, reply }).await?;
        rx.await.map_err(|_| FitcamError::ActorClosed)?
    }

    /// Persist the finished or stopped session through the store.
    pub async fn save(&self) -> Result<WorkoutSessionRecord, FitcamError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Save { reply }).await?;
        rx.await.map_err(|_| FitcamError::ActorClosed)?
    }

    /// Return a FINISHED or STOPPED session to SETUP.
    pub async fn reset(&self) -> Result<(), FitcamError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Reset { reply }).await?;
        rx.await.map_err(|_| FitcamError::ActorClosed)?
    }

    /// Snapshot taken after every message queued before this call.
    pub async fn query_progress(&self) -> Result<ProgressSnapshot, FitcamError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Query { reply }).await?;
        rx.await.map_err(|_| FitcamError::ActorClosed)
    }

    /// Latest published snapshot.
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.borrow().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        *self.save_status.borrow()
    }

    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.save_status.clone()
    }

    pub async fn wait_for_state(&self, state: SessionState) -> Result<ProgressSnapshot, FitcamError> {
        let mut rx = self.progress.clone();
        let snapshot = rx
            .wait_for(|s| s.state == state)
            .await
            .map_err(|_| FitcamError::ActorClosed)?
            .clone();
        Ok(snapshot)
    }

    pub fn is_alive(&self) -> bool {
        !self.inbox.is_closed()
    }

    async fn send(&self, message: SessionMessage) -> Result<(), FitcamError> {
        self.inbox
            .send(message)
            .await
            .map_err(|_| FitcamError::ActorClosed)
    }
}
