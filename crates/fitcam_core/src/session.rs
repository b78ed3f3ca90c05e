//! Workout lifecycle as a synchronous state machine.
//!
//! The machine owns every piece of session state and never touches a
//! clock or a task itself: each call returns the [`TimerEffect`]s the
//! caller has to apply before it admits the next event. The session actor
//! applies them inline, which keeps timer cancellation synchronous with
//! the transition that caused it.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::FitcamError;
use crate::filter::SignalFilter;
use crate::observability;
use crate::orientation::{DetectorKind, ExerciseProfile, OrientationValidator};
use crate::plank::{MAX_STABILITY, PlankStabilityTracker};
use crate::reps::RepetitionDetector;
use crate::timer::TimerKind;
use crate::types::{
    CommandEvent, MotionSample, POSTURE_PAUSED, POSTURE_READY, ProgressSnapshot, SessionState,
    SetProgress, WorkoutConfiguration, WorkoutSessionRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEffect {
    Start(TimerKind),
    Cancel(TimerKind),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Command(CommandEvent),
    Sample(MotionSample),
    ActiveTick,
    RestTick,
}

#[derive(Clone, Debug)]
enum Detector {
    Repetitions(RepetitionDetector),
    Stability(PlankStabilityTracker),
}

impl Detector {
    fn for_profile(profile: &ExerciseProfile) -> Self {
        match profile.detector {
            DetectorKind::Repetitions => Detector::Repetitions(RepetitionDetector::new()),
            DetectorKind::Stability => Detector::Stability(PlankStabilityTracker::new()),
        }
    }

    fn stability_score(&self) -> u8 {
        match self {
            Detector::Repetitions(_) => MAX_STABILITY,
            Detector::Stability(tracker) => tracker.stability_score(),
        }
    }
}

/// Sums across all sets of the current session.
#[derive(Clone, Debug, Default)]
struct SessionTotals {
    reps: u32,
    duration_secs: u64,
    sets_completed: u32,
    set_stability: Vec<u8>,
}

pub struct SessionStateMachine {
    config: WorkoutConfiguration,
    profile: ExerciseProfile,
    state: SessionState,
    progress: SetProgress,
    filter: SignalFilter,
    detector: Detector,
    posture_label: &'static str,
    rest_remaining_secs: u32,
    totals: SessionTotals,
    session_id: Uuid,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionStateMachine {
    pub fn new(config: WorkoutConfiguration) -> Result<Self, FitcamError> {
        config.validate()?;
        let profile = ExerciseProfile::for_kind(config.exercise);
        Ok(Self {
            detector: Detector::for_profile(&profile),
            config,
            profile,
            state: SessionState::Setup,
            progress: SetProgress::default(),
            filter: SignalFilter::new(),
            posture_label: POSTURE_READY,
            rest_remaining_secs: 0,
            totals: SessionTotals::default(),
            session_id: Uuid::new_v4(),
            completed_at: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn progress(&self) -> SetProgress {
        self.progress
    }

    pub fn config(&self) -> &WorkoutConfiguration {
        &self.config
    }

    /// Replace the targets. Only allowed before the session starts.
    pub fn configure(&mut self, config: WorkoutConfiguration) -> Result<(), FitcamError> {
        if self.state != SessionState::Setup {
            return Err(FitcamError::InvalidState {
                action: "configure",
                state: self.state,
            });
        }
        config.validate()?;
        self.profile = ExerciseProfile::for_kind(config.exercise);
        self.detector = Detector::for_profile(&self.profile);
        self.config = config;
        Ok(())
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<TimerEffect> {
        match event {
            SessionEvent::Command(command) => self.on_command(command),
            SessionEvent::Sample(sample) => self.on_sample(&sample),
            SessionEvent::ActiveTick => self.on_active_tick(),
            SessionEvent::RestTick => self.on_rest_tick(),
        }
    }

    /// Return to SETUP from FINISHED or STOPPED. A no-op while in SETUP.
    pub fn reset(&mut self) -> Result<Vec<TimerEffect>, FitcamError> {
        match self.state {
            SessionState::Setup => Ok(Vec::new()),
            SessionState::Finished | SessionState::Stopped => {
                self.state = SessionState::Setup;
                self.progress = SetProgress::default();
                self.reset_set();
                self.totals = SessionTotals::default();
                self.rest_remaining_secs = 0;
                self.posture_label = POSTURE_READY;
                self.completed_at = None;
                info!("session reset to setup");
                Ok(vec![
                    TimerEffect::Cancel(TimerKind::Active),
                    TimerEffect::Cancel(TimerKind::Rest),
                ])
            }
            state => Err(FitcamError::InvalidState {
                action: "reset",
                state,
            }),
        }
    }

    /// Assemble the record for a FINISHED or STOPPED session.
    pub fn record(&self) -> Result<WorkoutSessionRecord, FitcamError> {
        if !self.state.is_terminal() {
            return Err(FitcamError::InvalidState {
                action: "save",
                state: self.state,
            });
        }
        Ok(WorkoutSessionRecord {
            session_id: self.session_id,
            exercise: self.config.exercise,
            total_reps: self.totals.reps,
            total_duration_secs: self.totals.duration_secs,
            sets_completed: self.totals.sets_completed,
            stability_score: self.stability_summary(),
            completed_at: self.completed_at.unwrap_or_else(Utc::now),
        })
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            state: self.state,
            exercise: self.config.exercise,
            target_sets: self.config.target_sets,
            current_set: self.progress.current_set,
            current_reps: self.progress.current_reps,
            current_duration_secs: self.progress.current_duration_secs,
            stability_score: self.detector.stability_score(),
            posture_label: self.posture_label.to_string(),
            rest_remaining_secs: self.rest_remaining_secs,
        }
    }

    fn on_command(&mut self, command: CommandEvent) -> Vec<TimerEffect> {
        match (self.state, command) {
            (SessionState::Setup, CommandEvent::Start) => self.begin(),
            (SessionState::Paused, CommandEvent::Start) => {
                self.transition(SessionState::Active);
                self.posture_label = POSTURE_READY;
                vec![TimerEffect::Start(TimerKind::Active)]
            }
            (SessionState::Active, CommandEvent::Pause) => {
                self.transition(SessionState::Paused);
                self.posture_label = POSTURE_PAUSED;
                vec![TimerEffect::Cancel(TimerKind::Active)]
            }
            (SessionState::Active | SessionState::Paused, CommandEvent::Stop) => {
                self.close_partial_set();
                self.transition(SessionState::Stopped);
                self.completed_at = Some(Utc::now());
                vec![
                    TimerEffect::Cancel(TimerKind::Active),
                    TimerEffect::Cancel(TimerKind::Rest),
                ]
            }
            (state, command) => {
                debug!(%state, command = command.as_str(), "command discarded");
                observability::record_discarded_command(command);
                Vec::new()
            }
        }
    }

    fn begin(&mut self) -> Vec<TimerEffect> {
        self.session_id = Uuid::new_v4();
        self.progress = SetProgress::default();
        self.totals = SessionTotals::default();
        self.completed_at = None;
        self.reset_set();
        self.posture_label = POSTURE_READY;
        self.transition(SessionState::Active);
        info!(
            session_id = %self.session_id,
            exercise = self.config.exercise.title(),
            target_sets = self.config.target_sets,
            "workout started"
        );
        vec![TimerEffect::Start(TimerKind::Active)]
    }

    fn on_sample(&mut self, sample: &MotionSample) -> Vec<TimerEffect> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        let check = OrientationValidator::check(sample, &self.profile);
        self.posture_label = check.label;
        if !check.valid {
            observability::record_dropped_sample("orientation");
            return Vec::new();
        }

        let smoothed = self.filter.update(sample.magnitude());
        let set_done = match &mut self.detector {
            Detector::Repetitions(detector) => {
                if detector.observe(smoothed, sample.captured_at) {
                    self.progress.current_reps += 1;
                    self.totals.reps += 1;
                    observability::record_rep(self.config.exercise);
                    debug!(
                        set = self.progress.current_set,
                        reps = self.progress.current_reps,
                        "repetition counted"
                    );
                    self.progress.current_reps >= self.config.target_reps
                } else {
                    false
                }
            }
            Detector::Stability(tracker) => {
                tracker.observe(sample);
                tracker.is_complete(self.config.target_duration_secs)
            }
        };

        if set_done {
            self.complete_set()
        } else {
            Vec::new()
        }
    }

    fn on_active_tick(&mut self) -> Vec<TimerEffect> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        self.progress.current_duration_secs += 1;
        self.totals.duration_secs += 1;
        if let Detector::Stability(tracker) = &mut self.detector {
            tracker.tick();
            if tracker.is_complete(self.config.target_duration_secs) {
                return self.complete_set();
            }
        }
        Vec::new()
    }

    fn on_rest_tick(&mut self) -> Vec<TimerEffect> {
        if self.state != SessionState::Resting {
            return Vec::new();
        }
        self.rest_remaining_secs = self.rest_remaining_secs.saturating_sub(1);
        if self.rest_remaining_secs > 0 {
            return Vec::new();
        }
        let mut effects = vec![TimerEffect::Cancel(TimerKind::Rest)];
        effects.extend(self.next_set());
        effects
    }

    fn complete_set(&mut self) -> Vec<TimerEffect> {
        let mut effects = vec![TimerEffect::Cancel(TimerKind::Active)];
        self.totals.sets_completed += 1;
        self.totals.set_stability.push(self.detector.stability_score());
        observability::record_set_completed(self.config.exercise);
        info!(
            set = self.progress.current_set,
            target_sets = self.config.target_sets,
            "set complete"
        );

        if self.progress.current_set < self.config.target_sets {
            self.transition(SessionState::Resting);
            self.progress.current_reps = 0;
            self.progress.current_duration_secs = 0;
            self.reset_set();
            self.rest_remaining_secs = self.config.rest_secs;
            if self.rest_remaining_secs == 0 {
                effects.extend(self.next_set());
            } else {
                effects.push(TimerEffect::Start(TimerKind::Rest));
            }
        } else {
            self.transition(SessionState::Finished);
            self.completed_at = Some(Utc::now());
            info!(
                session_id = %self.session_id,
                total_reps = self.totals.reps,
                total_duration_secs = self.totals.duration_secs,
                "workout finished"
            );
        }
        effects
    }

    fn next_set(&mut self) -> Vec<TimerEffect> {
        self.progress.current_set += 1;
        self.progress.current_reps = 0;
        self.progress.current_duration_secs = 0;
        self.rest_remaining_secs = 0;
        self.reset_set();
        self.transition(SessionState::Active);
        vec![TimerEffect::Start(TimerKind::Active)]
    }

    /// Stability of a set interrupted by STOP still counts towards the summary.
    fn close_partial_set(&mut self) {
        let Detector::Stability(tracker) = &self.detector else {
            return;
        };
        let score = tracker.stability_score();
        let touched = self.progress.current_duration_secs > 0 || score < MAX_STABILITY;
        if touched {
            self.totals.set_stability.push(score);
        }
    }

    fn reset_set(&mut self) {
        self.filter.reset();
        self.detector = Detector::for_profile(&self.profile);
    }

    fn stability_summary(&self) -> u8 {
        let scores = &self.totals.set_stability;
        if scores.is_empty() {
            return self.detector.stability_score();
        }
        let sum: u32 = scores.iter().map(|s| u32::from(*s)).sum();
        let len = scores.len() as u32;
        ((sum + len / 2) / len) as u8
    }

    fn transition(&mut self, to: SessionState) {
        debug!(from = %self.state, %to, "session transition");
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExerciseKind;
    use chrono::TimeDelta;

    fn reps_config(sets: u32, reps: u32, rest: u32) -> WorkoutConfiguration {
        WorkoutConfiguration {
            exercise: ExerciseKind::PushUp,
            target_sets: sets,
            target_reps: reps,
            target_duration_secs: 30,
            rest_secs: rest,
        }
    }

    fn plank_config(sets: u32, secs: u64) -> WorkoutConfiguration {
        WorkoutConfiguration {
            exercise: ExerciseKind::Plank,
            target_sets: sets,
            target_reps: 1,
            target_duration_secs: secs,
            rest_secs: 5,
        }
    }

    /// Drives `sm` through one full down/up cycle starting at `t0`.
    fn push_up_cycle(sm: &mut SessionStateMachine, t0: DateTime<Utc>) -> Vec<TimerEffect> {
        let mut effects = Vec::new();
        for i in 0..30 {
            let at = t0 + TimeDelta::milliseconds(i * 10);
            effects.extend(sm.handle(SessionEvent::Sample(MotionSample::new(0.0, 0.0, 7.5, at))));
        }
        for i in 30..60 {
            let at = t0 + TimeDelta::milliseconds(i * 10);
            effects.extend(sm.handle(SessionEvent::Sample(MotionSample::new(0.0, 0.0, 14.0, at))));
        }
        effects
    }

    fn start(sm: &mut SessionStateMachine) {
        let effects = sm.handle(SessionEvent::Command(CommandEvent::Start));
        assert_eq!(effects, vec![TimerEffect::Start(TimerKind::Active)]);
    }

    #[test]
    fn new_rejects_invalid_configuration() {
        assert!(SessionStateMachine::new(reps_config(0, 5, 0)).is_err());
    }

    #[test]
    fn setup_start_activates_and_starts_timer() {
        let mut sm = SessionStateMachine::new(reps_config(2, 5, 10)).unwrap();
        assert_eq!(sm.state(), SessionState::Setup);
        start(&mut sm);
        assert_eq!(sm.state(), SessionState::Active);
        assert_eq!(sm.progress(), SetProgress::default());
    }

    #[test]
    fn rep_cycles_complete_set_and_rest() {
        let mut sm = SessionStateMachine::new(reps_config(2, 5, 10)).unwrap();
        start(&mut sm);
        let t0 = Utc::now();
        let mut effects = Vec::new();
        for cycle in 0..5 {
            effects = push_up_cycle(&mut sm, t0 + TimeDelta::seconds(cycle));
        }
        assert_eq!(sm.state(), SessionState::Resting);
        assert_eq!(sm.progress().current_set, 1);
        assert_eq!(sm.progress().current_reps, 0);
        assert_eq!(
            effects,
            vec![
                TimerEffect::Cancel(TimerKind::Active),
                TimerEffect::Start(TimerKind::Rest)
            ]
        );
        assert_eq!(sm.snapshot().rest_remaining_secs, 10);

        for _ in 0..9 {
            assert!(sm.handle(SessionEvent::RestTick).is_empty());
        }
        let effects = sm.handle(SessionEvent::RestTick);
        assert_eq!(
            effects,
            vec![
                TimerEffect::Cancel(TimerKind::Rest),
                TimerEffect::Start(TimerKind::Active)
            ]
        );
        assert_eq!(sm.state(), SessionState::Active);
        assert_eq!(sm.progress().current_set, 2);
        assert_eq!(sm.progress().current_reps, 0);
    }

    #[test]
    fn zero_rest_moves_straight_to_next_set() {
        let mut sm = SessionStateMachine::new(reps_config(2, 1, 0)).unwrap();
        start(&mut sm);
        let effects = push_up_cycle(&mut sm, Utc::now());
        assert_eq!(sm.state(), SessionState::Active);
        assert_eq!(sm.progress().current_set, 2);
        assert_eq!(
            effects,
            vec![
                TimerEffect::Cancel(TimerKind::Active),
                TimerEffect::Start(TimerKind::Active)
            ]
        );
    }

    #[test]
    fn final_set_finishes() {
        let mut sm = SessionStateMachine::new(reps_config(1, 2, 10)).unwrap();
        start(&mut sm);
        let t0 = Utc::now();
        push_up_cycle(&mut sm, t0);
        let effects = push_up_cycle(&mut sm, t0 + TimeDelta::seconds(1));
        assert_eq!(sm.state(), SessionState::Finished);
        assert_eq!(effects, vec![TimerEffect::Cancel(TimerKind::Active)]);
        assert_eq!(sm.progress().current_reps, 2);
    }

    #[test]
    fn invalid_orientation_blocks_detection() {
        let mut sm = SessionStateMachine::new(reps_config(1, 1, 0)).unwrap();
        start(&mut sm);
        let t0 = Utc::now();
        for i in 0..100 {
            let at = t0 + TimeDelta::milliseconds(i * 20);
            let y = if i % 2 == 0 { 5.0 } else { 15.0 };
            sm.handle(SessionEvent::Sample(MotionSample::new(0.0, y, 1.0, at)));
        }
        assert_eq!(sm.progress().current_reps, 0);
        assert_eq!(sm.snapshot().posture_label, "Place phone flat");
    }

    #[test]
    fn samples_are_dropped_outside_active() {
        let mut sm = SessionStateMachine::new(reps_config(1, 1, 0)).unwrap();
        push_up_cycle(&mut sm, Utc::now());
        assert_eq!(sm.progress().current_reps, 0);
        assert_eq!(sm.snapshot().posture_label, POSTURE_READY);

        start(&mut sm);
        sm.handle(SessionEvent::Command(CommandEvent::Pause));
        push_up_cycle(&mut sm, Utc::now());
        assert_eq!(sm.progress().current_reps, 0);
    }

    #[test]
    fn plank_finishes_on_ticks_with_full_stability() {
        let mut sm = SessionStateMachine::new(plank_config(1, 10)).unwrap();
        start(&mut sm);
        let t0 = Utc::now();
        for tick in 0..10 {
            for i in 0..20 {
                let at = t0 + TimeDelta::milliseconds(tick * 1000 + i * 50);
                sm.handle(SessionEvent::Sample(MotionSample::new(0.5, 0.6, 9.7, at)));
            }
            sm.handle(SessionEvent::ActiveTick);
        }
        assert_eq!(sm.state(), SessionState::Finished);
        assert_eq!(sm.snapshot().stability_score, 100);
        let record = sm.record().unwrap();
        assert_eq!(record.total_duration_secs, 10);
        assert_eq!(record.sets_completed, 1);
        assert_eq!(record.stability_score, 100);
    }

    #[test]
    fn plank_stability_is_non_increasing() {
        let mut sm = SessionStateMachine::new(plank_config(1, 600)).unwrap();
        start(&mut sm);
        let mut previous = sm.snapshot().stability_score;
        for i in 0..400 {
            let x = if i % 4 == 0 { 0.1 } else { 2.0 };
            sm.handle(SessionEvent::Sample(MotionSample::new(x, 0.0, 9.6, Utc::now())));
            let score = sm.snapshot().stability_score;
            assert!(score <= previous);
            previous = score;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn pause_resume_keeps_counters() {
        let mut sm = SessionStateMachine::new(reps_config(1, 10, 0)).unwrap();
        start(&mut sm);
        push_up_cycle(&mut sm, Utc::now());
        sm.handle(SessionEvent::ActiveTick);
        let before = sm.progress();

        let effects = sm.handle(SessionEvent::Command(CommandEvent::Pause));
        assert_eq!(effects, vec![TimerEffect::Cancel(TimerKind::Active)]);
        assert_eq!(sm.snapshot().posture_label, POSTURE_PAUSED);
        // a tick that slipped through after the pause is ignored
        assert!(sm.handle(SessionEvent::ActiveTick).is_empty());

        let effects = sm.handle(SessionEvent::Command(CommandEvent::Start));
        assert_eq!(effects, vec![TimerEffect::Start(TimerKind::Active)]);
        assert_eq!(sm.progress(), before);
    }

    #[test]
    fn stop_from_active_or_paused() {
        for pause_first in [false, true] {
            let mut sm = SessionStateMachine::new(reps_config(3, 10, 0)).unwrap();
            start(&mut sm);
            if pause_first {
                sm.handle(SessionEvent::Command(CommandEvent::Pause));
            }
            let effects = sm.handle(SessionEvent::Command(CommandEvent::Stop));
            assert_eq!(sm.state(), SessionState::Stopped);
            assert!(effects.contains(&TimerEffect::Cancel(TimerKind::Active)));
            assert!(effects.contains(&TimerEffect::Cancel(TimerKind::Rest)));
        }
    }

    #[test]
    fn commands_without_transition_are_discarded() {
        let mut sm = SessionStateMachine::new(reps_config(2, 1, 30)).unwrap();
        assert!(sm.handle(SessionEvent::Command(CommandEvent::Pause)).is_empty());
        assert!(sm.handle(SessionEvent::Command(CommandEvent::Stop)).is_empty());
        assert_eq!(sm.state(), SessionState::Setup);

        start(&mut sm);
        assert!(sm.handle(SessionEvent::Command(CommandEvent::Start)).is_empty());
        push_up_cycle(&mut sm, Utc::now());
        assert_eq!(sm.state(), SessionState::Resting);
        assert!(sm.handle(SessionEvent::Command(CommandEvent::Pause)).is_empty());
        assert!(sm.handle(SessionEvent::Command(CommandEvent::Stop)).is_empty());
        assert_eq!(sm.state(), SessionState::Resting);
    }

    #[test]
    fn record_sums_all_sets() {
        let mut sm = SessionStateMachine::new(reps_config(2, 2, 1)).unwrap();
        assert!(sm.record().is_err());
        start(&mut sm);
        let t0 = Utc::now();
        push_up_cycle(&mut sm, t0);
        sm.handle(SessionEvent::ActiveTick);
        push_up_cycle(&mut sm, t0 + TimeDelta::seconds(1));
        sm.handle(SessionEvent::RestTick);
        assert_eq!(sm.progress().current_set, 2);
        push_up_cycle(&mut sm, t0 + TimeDelta::seconds(3));
        sm.handle(SessionEvent::ActiveTick);
        sm.handle(SessionEvent::ActiveTick);
        push_up_cycle(&mut sm, t0 + TimeDelta::seconds(4));

        assert_eq!(sm.state(), SessionState::Finished);
        let record = sm.record().unwrap();
        assert_eq!(record.total_reps, 4);
        assert_eq!(record.total_duration_secs, 3);
        assert_eq!(record.sets_completed, 2);
        assert_eq!(record.exercise, ExerciseKind::PushUp);
    }

    #[test]
    fn stopped_plank_averages_partial_set() {
        let mut sm = SessionStateMachine::new(plank_config(2, 2)).unwrap();
        start(&mut sm);
        sm.handle(SessionEvent::ActiveTick);
        sm.handle(SessionEvent::ActiveTick);
        assert_eq!(sm.state(), SessionState::Resting);
        for _ in 0..5 {
            sm.handle(SessionEvent::RestTick);
        }
        assert_eq!(sm.state(), SessionState::Active);
        for _ in 0..20 {
            sm.handle(SessionEvent::Sample(MotionSample::new(2.0, 0.0, 9.5, Utc::now())));
        }
        sm.handle(SessionEvent::ActiveTick);
        sm.handle(SessionEvent::Command(CommandEvent::Stop));

        let record = sm.record().unwrap();
        assert_eq!(record.sets_completed, 1);
        assert_eq!(record.stability_score, 90);
        assert_eq!(record.total_duration_secs, 3);
    }

    #[test]
    fn stopped_plank_keeps_shake_from_before_first_tick() {
        let mut sm = SessionStateMachine::new(WorkoutConfiguration {
            rest_secs: 0,
            ..plank_config(2, 1)
        })
        .unwrap();
        start(&mut sm);
        sm.handle(SessionEvent::ActiveTick);
        assert_eq!(sm.progress().current_set, 2);
        for _ in 0..40 {
            sm.handle(SessionEvent::Sample(MotionSample::new(2.0, 0.0, 9.5, Utc::now())));
        }
        assert_eq!(sm.snapshot().stability_score, 60);
        sm.handle(SessionEvent::Command(CommandEvent::Stop));

        let record = sm.record().unwrap();
        assert_eq!(record.sets_completed, 1);
        assert_eq!(record.stability_score, 80);
    }

    #[test]
    fn stopped_plank_ignores_untouched_set() {
        let mut sm = SessionStateMachine::new(WorkoutConfiguration {
            rest_secs: 0,
            ..plank_config(2, 1)
        })
        .unwrap();
        start(&mut sm);
        for _ in 0..10 {
            sm.handle(SessionEvent::Sample(MotionSample::new(2.0, 0.0, 9.5, Utc::now())));
        }
        sm.handle(SessionEvent::ActiveTick);
        sm.handle(SessionEvent::Command(CommandEvent::Stop));

        assert_eq!(sm.record().unwrap().stability_score, 90);
    }

    #[test]
    fn plank_pause_resume_keeps_stability() {
        let mut sm = SessionStateMachine::new(plank_config(1, 30)).unwrap();
        start(&mut sm);
        for _ in 0..7 {
            sm.handle(SessionEvent::Sample(MotionSample::new(2.0, 0.0, 9.5, Utc::now())));
        }
        sm.handle(SessionEvent::ActiveTick);
        assert_eq!(sm.snapshot().stability_score, 93);

        sm.handle(SessionEvent::Command(CommandEvent::Pause));
        assert_eq!(sm.snapshot().stability_score, 93);
        sm.handle(SessionEvent::Sample(MotionSample::new(2.0, 0.0, 9.5, Utc::now())));
        let effects = sm.handle(SessionEvent::Command(CommandEvent::Start));
        assert_eq!(effects, vec![TimerEffect::Start(TimerKind::Active)]);
        assert_eq!(sm.snapshot().stability_score, 93);
        assert_eq!(sm.progress().current_duration_secs, 1);
    }

    #[test]
    fn reset_only_from_terminal_states() {
        let mut sm = SessionStateMachine::new(reps_config(1, 1, 0)).unwrap();
        assert!(sm.reset().unwrap().is_empty());
        start(&mut sm);
        assert!(sm.reset().is_err());

        push_up_cycle(&mut sm, Utc::now());
        assert_eq!(sm.state(), SessionState::Finished);
        let effects = sm.reset().unwrap();
        assert!(effects.contains(&TimerEffect::Cancel(TimerKind::Active)));
        assert!(effects.contains(&TimerEffect::Cancel(TimerKind::Rest)));
        assert_eq!(sm.state(), SessionState::Setup);
        assert_eq!(sm.progress(), SetProgress::default());
        assert_eq!(sm.snapshot().stability_score, 100);
    }

    #[test]
    fn configure_only_in_setup() {
        let mut sm = SessionStateMachine::new(reps_config(1, 1, 0)).unwrap();
        sm.configure(plank_config(1, 5)).unwrap();
        assert_eq!(sm.config().exercise, ExerciseKind::Plank);
        start(&mut sm);
        assert!(matches!(
            sm.configure(reps_config(1, 1, 0)),
            Err(FitcamError::InvalidState { .. })
        ));
    }
}
