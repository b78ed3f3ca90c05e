//! Cancellable 1 Hz timers, one slot per category.
//!
//! Each running timer is a spawned task that posts [`TimerTick`]s into a
//! channel owned by the session actor. Starting a category first aborts
//! whatever already runs in that slot, so at most one task per category
//! is ever alive. Every start also bumps a generation number; a tick that
//! was already queued when its timer got cancelled carries a stale
//! generation and is rejected by [`TimerService::accepts`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::trace;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Runs while the session is ACTIVE.
    Active,
    /// Rest countdown between sets.
    Rest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerTick {
    pub kind: TimerKind,
    pub generation: u64,
}

struct TimerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

pub struct TimerService {
    ticks: mpsc::Sender<TimerTick>,
    period: Duration,
    active: Option<TimerHandle>,
    rest: Option<TimerHandle>,
    next_generation: u64,
}

impl TimerService {
    pub fn new(ticks: mpsc::Sender<TimerTick>) -> Self {
        Self::with_period(ticks, TICK_PERIOD)
    }

    pub fn with_period(ticks: mpsc::Sender<TimerTick>, period: Duration) -> Self {
        Self {
            ticks,
            period,
            active: None,
            rest: None,
            next_generation: 0,
        }
    }

    /// Start (or restart) the timer of `kind`. Must run inside a tokio runtime.
    pub fn start(&mut self, kind: TimerKind) -> u64 {
        self.cancel(kind);
        self.next_generation += 1;
        let generation = self.next_generation;

        let tx = self.ticks.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(TimerTick { kind, generation }).await.is_err() {
                    break;
                }
            }
        });
        trace!(?kind, generation, "timer started");
        *self.slot(kind) = Some(TimerHandle { generation, task });
        generation
    }

    /// Stop the timer of `kind`. Returns whether one was running.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.slot(kind).take() {
            Some(handle) => {
                handle.task.abort();
                trace!(?kind, generation = handle.generation, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::Active);
        self.cancel(TimerKind::Rest);
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Active => self.active.is_some(),
            TimerKind::Rest => self.rest.is_some(),
        }
    }

    /// Whether `tick` belongs to the live timer of its category.
    pub fn accepts(&self, tick: &TimerTick) -> bool {
        let slot = match tick.kind {
            TimerKind::Active => &self.active,
            TimerKind::Rest => &self.rest,
        };
        slot.as_ref()
            .is_some_and(|handle| handle.generation == tick.generation)
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Active => &mut self.active,
            TimerKind::Rest => &mut self.rest,
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
